use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Type};

/// `#[accessor]` fields of type `Option<SharedState<T>>` get an `Accessor<T>` impl.
#[proc_macro_derive(Accessor, attributes(accessor))]
pub fn derive_accessor(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input, "accessor", "Accessor", "access", "SharedState").unwrap_or_else(|e| e.to_compile_error()).into()
}

/// `#[consumer]` fields of type `Option<Broadcaster<T>>` get a `Consumer<T>` impl.
#[proc_macro_derive(Consumer, attributes(consumer))]
pub fn derive_consumer(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input, "consumer", "Consumer", "consume", "Broadcaster").unwrap_or_else(|e| e.to_compile_error()).into()
}

/// `#[producer]` fields of type `Option<Broadcaster<T>>` get a `Producer<T>` impl.
#[proc_macro_derive(Producer, attributes(producer))]
pub fn derive_producer(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input, "producer", "Producer", "produce", "Broadcaster").unwrap_or_else(|e| e.to_compile_error()).into()
}

fn expand(input: DeriveInput, attr: &str, trait_name: &str, method: &str, wrapper: &str) -> syn::Result<TokenStream2> {
    let name = input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match input.data {
        Data::Struct(s) => match s.fields {
            Fields::Named(named) => named.named,
            other => return Err(Error::new(other.span(), "only named fields are supported")),
        },
        _ => return Err(Error::new(name.span(), "this derive only works for structs")),
    };

    let trait_ident = format_ident!("{}", trait_name);
    let method_ident = format_ident!("{}", method);
    let wrapper_ident = format_ident!("{}", wrapper);

    let mut impls = Vec::new();
    for field in fields.iter().filter(|f| f.attrs.iter().any(|a| a.path().is_ident(attr))) {
        let field_name: &Ident = field.ident.as_ref().ok_or_else(|| Error::new(field.span(), "field needs a name"))?;
        let option_arg = single_generic_arg(&field.ty, "Option")?;
        let inner = single_generic_arg(option_arg, wrapper)?;

        impls.push(quote! {
            impl #impl_generics ::otc_actors::#trait_ident<#inner> for #name #ty_generics #where_clause {
                fn #method_ident(&mut self, value: ::otc_actors::#wrapper_ident<#inner>) -> &mut Self {
                    self.#field_name = Some(value);
                    self
                }
            }
        });
    }

    Ok(quote! { #(#impls)* })
}

/// Returns `T` for a type written as `Outer<T>`, checking the last path segment.
fn single_generic_arg<'a>(ty: &'a Type, outer: &str) -> syn::Result<&'a Type> {
    let Type::Path(type_path) = ty else {
        return Err(Error::new(ty.span(), format!("expected {outer}<T>")));
    };
    let segment = type_path.path.segments.last().ok_or_else(|| Error::new(ty.span(), "empty type path"))?;
    if segment.ident != outer {
        return Err(Error::new(segment.span(), format!("expected {outer}<T>, found {}", segment.ident)));
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(params) => match params.args.first() {
            Some(GenericArgument::Type(inner)) => Ok(inner),
            _ => Err(Error::new(params.span(), "expected a type parameter")),
        },
        _ => Err(Error::new(segment.span(), "expected angle brackets")),
    }
}
