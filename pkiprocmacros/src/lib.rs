//! Procedural macros used to generate getters and setters for the `CertificationPathSettings`
//! variant map defined in certpath.
//!
//! Each macro expands to an `impl CertificationPathSettings` block containing a getter and a
//! setter named after the key, i.e., `PS_ITERATION_LIMIT` yields `get_iteration_limit` and
//! `set_iteration_limit`. The value type must be the name of a `CertificationPathProcessingTypes`
//! variant, with primitive type names mapped to the variant spelling (`bool` to `Bool`, `u32` to
//! `U32`, etc.).

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream, Result};
use syn::{Expr, Ident, Token};

type ValueName = Ident;
type ValueType = Ident;
type DefaultValue = Expr;

/// Signature contains the results of parsing a cps_gets_and_sets definition, i.e., the name of a
/// value stored in a CertificationPathSettings map and the corresponding type. For example:
///     ```text
///     cps_gets_and_sets!(PS_BUILD_TIMEOUT, Duration);
///     ```
struct Signature {
    value_name: ValueName,
    value_type: ValueType,
}

impl Parse for Signature {
    fn parse(stream: ParseStream) -> Result<Self> {
        let value_name: ValueName = stream.parse()?;
        let _comma: Token!(,) = stream.parse()?;
        let value_type: ValueType = stream.parse()?;
        Ok(Signature {
            value_name,
            value_type,
        })
    }
}

/// SignatureWithDefault adds the default value returned when the key is absent. For example:
///     ```text
///     cps_gets_and_sets_with_default!(PS_EXPLORE_ALL_PATHS, bool, false);
///     ```
struct SignatureWithDefault {
    value_name: ValueName,
    value_type: ValueType,
    default_value: DefaultValue,
}

impl Parse for SignatureWithDefault {
    fn parse(stream: ParseStream) -> Result<Self> {
        let value_name: ValueName = stream.parse()?;
        let _comma: Token!(,) = stream.parse()?;
        let value_type: ValueType = stream.parse()?;
        let _comma2: Token!(,) = stream.parse()?;
        let default_value: DefaultValue = stream.parse()?;
        Ok(SignatureWithDefault {
            value_name,
            value_type,
            default_value,
        })
    }
}

/// Names and doc strings shared by both macro flavors.
struct Accessors {
    getter: Ident,
    setter: Ident,
    variant: Ident,
    getter_comment: String,
    setter_comment: String,
}

/// is_string_numeric is used to recognize primitive numeric type names (u8, u32, u64) after the
/// first character has been dropped.
fn is_string_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn variant_name(value_type: &Ident) -> String {
    let type_str = value_type.to_string();
    if type_str == "bool" {
        "Bool".to_string()
    } else if is_string_numeric(&type_str[1..]) {
        type_str.to_uppercase()
    } else {
        type_str
    }
}

fn accessors(flag: &Ident, value_type: &Ident) -> Accessors {
    // keys are expected to carry a three character prefix, i.e., PS_
    let flag_str = flag.to_string()[3..].to_lowercase();
    let getter_str = format!("get_{}", flag_str);
    let setter_str = format!("set_{}", flag_str);
    Accessors {
        getter: Ident::new(&getter_str, flag.span()),
        setter: Ident::new(&setter_str, flag.span()),
        variant: Ident::new(&variant_name(value_type), value_type.span()),
        getter_comment: format!(
            "`{}` is used to retrieve `{}` items from a [`CertificationPathSettings`] instance",
            getter_str, flag
        ),
        setter_comment: format!(
            "`{}` is used to set `{}` items in a [`CertificationPathSettings`] instance",
            setter_str, flag
        ),
    }
}

fn setter_tokens(flag: &Ident, value_type: &Ident, acc: &Accessors) -> TokenStream {
    let setter = &acc.setter;
    let variant = &acc.variant;
    let setter_comment = &acc.setter_comment;
    quote! {
        #[doc = #setter_comment]
        pub fn #setter(&mut self, v: #value_type) {
            self.0.insert(
                #flag.to_string(),
                CertificationPathProcessingTypes::#variant(v),
            );
        }
    }
}

/// `cps_gets_and_sets` generates a getter returning `Option<T>` and a setter for the given key.
#[proc_macro]
pub fn cps_gets_and_sets(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as Signature);
    let flag = signature.value_name;
    let return_t = signature.value_type;
    let acc = accessors(&flag, &return_t);
    let getter = &acc.getter;
    let variant = &acc.variant;
    let getter_comment = &acc.getter_comment;
    let setter = setter_tokens(&flag, &return_t, &acc);

    let tokens = quote! {
        impl CertificationPathSettings {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> Option<#return_t> {
                match self.0.get(#flag) {
                    Some(CertificationPathProcessingTypes::#variant(v)) => Some(v.clone()),
                    _ => None,
                }
            }
            #setter
        }
    };
    tokens.into()
}

/// `cps_gets_and_sets_with_default` generates a getter that returns the default value when the
/// key is absent (or holds a value of the wrong type) and a setter for the given key.
#[proc_macro]
pub fn cps_gets_and_sets_with_default(
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as SignatureWithDefault);
    let flag = signature.value_name;
    let return_t = signature.value_type;
    let default_value = signature.default_value;
    let acc = accessors(&flag, &return_t);
    let getter = &acc.getter;
    let variant = &acc.variant;
    let getter_comment = &acc.getter_comment;
    let setter = setter_tokens(&flag, &return_t, &acc);

    let tokens = quote! {
        impl CertificationPathSettings {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> #return_t {
                match self.0.get(#flag) {
                    Some(CertificationPathProcessingTypes::#variant(v)) => v.clone(),
                    _ => #default_value,
                }
            }
            #setter
        }
    };
    tokens.into()
}
