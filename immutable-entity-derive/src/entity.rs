//! Implementation of the `#[derive(Entity)]` macro.
//!
//! This module contains the procedural macro implementation that generates
//! the attribute descriptor table and typed attribute accessors for structs.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    Data, DeriveInput, Field, Fields, Generics, Ident, LitStr, Type, Visibility,
    parse_macro_input, parse_quote,
};

/// A struct field that takes part in the attribute set.
struct EntityField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    public: bool,
}

/// Main implementation of the Entity derive macro.
pub fn derive_entity_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;

    let expanded = match &input.data {
        Data::Struct(data_struct) => generate_entity(name, generics, &data_struct.fields),
        Data::Enum(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Entity can only be derived for structs, not enums.",
        )),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Entity cannot be derived for unions.",
        )),
    };

    TokenStream::from(expanded.unwrap_or_else(syn::Error::into_compile_error))
}

/// Generates the `Entity` impl and the accessor methods for a struct.
fn generate_entity(
    name: &Ident,
    generics: &Generics,
    fields: &Fields,
) -> syn::Result<TokenStream2> {
    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Entity cannot be derived for types with lifetime parameters.",
        ));
    }

    let entity_fields = match fields {
        Fields::Named(named_fields) => collect_fields(named_fields.named.iter())?,
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Entity can only be derived for structs with named fields, not tuple structs.",
            ));
        }
    };

    let descriptors = entity_fields.iter().map(generate_descriptor);
    let accessors = entity_fields.iter().map(generate_accessor);

    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();
    let entity_generics = entity_generics(name, generics, &entity_fields);
    let (_, _, entity_where_clause) = entity_generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::immutable_entity::Entity for #name #type_generics #entity_where_clause {
            const ATTRIBUTES: &'static [::immutable_entity::AttributeDescriptor<Self>] = &[
                #(#descriptors),*
            ];
        }

        impl #impl_generics #name #type_generics #where_clause {
            #(#accessors)*
        }
    })
}

fn collect_fields<'a>(
    fields: impl Iterator<Item = &'a Field>,
) -> syn::Result<Vec<EntityField<'a>>> {
    let mut collected = Vec::new();
    for field in fields {
        if is_skipped(field)? {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Named field must have ident"));
        };
        collected.push(EntityField {
            ident,
            ty: &field.ty,
            public: matches!(field.vis, Visibility::Public(_)),
        });
    }
    Ok(collected)
}

/// Reads `#[entity(skip)]`.
fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attribute in &field.attrs {
        if !attribute.path().is_ident("entity") {
            continue;
        }
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

/// Adds the bounds the descriptor table needs on generic entities.
fn entity_generics(name: &Ident, generics: &Generics, fields: &[EntityField<'_>]) -> Generics {
    let mut entity_generics = generics.clone();
    if generics.params.is_empty() {
        return entity_generics;
    }

    let (_, type_generics, _) = generics.split_for_impl();
    let where_clause = entity_generics.make_where_clause();
    for parameter in generics.type_params() {
        let ident = &parameter.ident;
        where_clause.predicates.push(parse_quote!(#ident: 'static));
    }
    where_clause
        .predicates
        .push(parse_quote!(#name #type_generics: ::core::default::Default));
    for field in fields {
        let ty = field.ty;
        where_clause
            .predicates
            .push(parse_quote!(#ty: ::core::clone::Clone));
    }
    entity_generics
}

fn generate_descriptor(field: &EntityField<'_>) -> TokenStream2 {
    let field_name = field.ident;
    let field_type = field.ty;
    let name = LitStr::new(&field_name.unraw().to_string(), field_name.span());
    let type_name = LitStr::new(&type_display(field_type), field_name.span());
    let channel = if field.public {
        format_ident!("Mutator")
    } else {
        format_ident!("BackingSlot")
    };

    quote! {
        ::immutable_entity::AttributeDescriptor::new(
            #name,
            #type_name,
            ::immutable_entity::AttributeType::of::<#field_type>(),
            ::immutable_entity::WriteChannel::#channel(::immutable_entity::Slot::new(
                |source: &Self, target: &mut Self| {
                    target.#field_name = ::core::clone::Clone::clone(&source.#field_name);
                },
                |target: &mut Self, value: ::std::boxed::Box<dyn ::core::any::Any>| {
                    value
                        .downcast::<#field_type>()
                        .map(|value| target.#field_name = *value)
                },
            )),
        )
    }
}

fn generate_accessor(field: &EntityField<'_>) -> TokenStream2 {
    let field_name = field.ident;
    let field_type = field.ty;
    let unraw = field_name.unraw();
    let name = LitStr::new(&unraw.to_string(), field_name.span());
    let method_name = format_ident!("{}_attribute", unraw);
    let doc = format!("Returns the typed accessor for the `{unraw}` attribute.");

    quote! {
        #[doc = #doc]
        #[inline]
        #[must_use]
        pub fn #method_name() -> ::immutable_entity::Attribute<Self, #field_type> {
            ::immutable_entity::Attribute::<Self, #field_type>::new(
                #name,
                |source: &Self| &source.#field_name,
            )
        }
    }
}

/// Renders a type the way it is usually written, without token spacing.
fn type_display(ty: &Type) -> String {
    let rendered = quote!(#ty).to_string();
    let mut display = String::with_capacity(rendered.len());
    let mut characters = rendered.chars().peekable();

    while let Some(character) = characters.next() {
        if character != ' ' {
            display.push(character);
            continue;
        }
        let previous = display.chars().next_back();
        let next = characters.peek().copied();
        let after_separator = matches!(previous, Some(',' | ';'));
        let glued = matches!(previous, Some('<' | '&' | '(' | '[' | ':'))
            || matches!(next, Some('<' | '>' | ',' | ')' | ']' | ':' | ';' | '('));
        if after_separator || !glued {
            display.push(' ');
        }
    }

    display
}

#[cfg(test)]
mod tests {
    use super::{generate_entity, is_skipped, type_display};
    use rstest::rstest;
    use syn::{Data, DeriveInput, Fields, Type};

    fn expand(source: &str) -> syn::Result<String> {
        let input: DeriveInput = syn::parse_str(source).unwrap();
        let Data::Struct(data_struct) = &input.data else {
            panic!("expected a struct");
        };
        generate_entity(&input.ident, &input.generics, &data_struct.fields)
            .map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_named_struct_expands() {
        let expanded = expand("struct Person { pub name: String, age: u32 }").unwrap();

        assert!(expanded.contains("const ATTRIBUTES"));
        assert!(expanded.contains("WriteChannel :: Mutator"));
        assert!(expanded.contains("WriteChannel :: BackingSlot"));
        assert!(expanded.contains("fn name_attribute"));
        assert!(expanded.contains("fn age_attribute"));
        assert!(expanded.contains("AttributeType :: of :: < u32 > ()"));
    }

    #[test]
    fn test_generic_struct_gets_bounds() {
        let expanded = expand("struct Container<T> { value: T }").unwrap();

        assert!(expanded.contains("T : 'static"));
        assert!(expanded.contains("Container < T > : :: core :: default :: Default"));
        assert!(expanded.contains("T : :: core :: clone :: Clone"));
    }

    #[rstest]
    #[case("struct Pair(i32, i32);", "tuple structs")]
    #[case("struct View<'a> { name: &'a str }", "lifetime parameters")]
    #[case("struct Session { #[entity(rename)] user: String }", "expected `skip`")]
    fn test_unsupported_input_is_rejected(#[case] source: &str, #[case] message: &str) {
        let error = expand(source).unwrap_err();
        assert!(error.to_string().contains(message), "{error}");
    }

    #[test]
    fn test_skip_attribute_is_detected() {
        let input: DeriveInput =
            syn::parse_str("struct Session { user: String, #[entity(skip)] cache: Vec<u8> }")
                .unwrap();
        let Data::Struct(data_struct) = &input.data else {
            panic!("expected a struct");
        };
        let Fields::Named(fields) = &data_struct.fields else {
            panic!("expected named fields");
        };
        let skipped: Vec<bool> = fields
            .named
            .iter()
            .map(|field| is_skipped(field).unwrap())
            .collect();

        assert_eq!(skipped, vec![false, true]);
    }

    #[rstest]
    #[case("String", "String")]
    #[case("Vec<i32>", "Vec<i32>")]
    #[case("Option<Vec<String>>", "Option<Vec<String>>")]
    #[case("(u8, bool)", "(u8, bool)")]
    #[case("[u8; 4]", "[u8; 4]")]
    #[case("std::collections::HashMap<String, u32>", "std::collections::HashMap<String, u32>")]
    #[case("&'static str", "&'static str")]
    #[case("Box<dyn Fn(u8) -> u8>", "Box<dyn Fn(u8) -> u8>")]
    fn test_type_display(#[case] source: &str, #[case] expected: &str) {
        let ty: Type = syn::parse_str(source).unwrap();
        assert_eq!(type_display(&ty), expected);
    }
}
