//! Attribute parsing for `#[middleware(...)]`.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, ExprArray, Lit, LitStr};

/// Method scope, as written in `scope = "..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeAttr {
    Instance,
    Class,
}

impl ScopeAttr {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "instance" => Some(Self::Instance),
            "class" => Some(Self::Class),
            _ => None,
        }
    }

    pub(crate) const fn variant(self) -> &'static str {
        match self {
            Self::Instance => "Instance",
            Self::Class => "Class",
        }
    }
}

/// Entity kind, as written in `entity = "..."`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EntityAttr {
    Builtin(&'static str),
    Custom(String),
}

impl EntityAttr {
    pub(crate) fn parse(s: &str) -> Self {
        match s {
            "service" => Self::Builtin("Service"),
            "step" => Self::Builtin("Step"),
            "result" => Self::Builtin("Result"),
            "feature" => Self::Builtin("Feature"),
            other => Self::Custom(other.to_string()),
        }
    }
}

/// `intended_for(...)` options.
#[derive(Debug, Clone, Default)]
pub(crate) struct IntendedForAttrs {
    pub(crate) methods: Option<Vec<String>>,
    pub(crate) scope: Option<ScopeAttr>,
    pub(crate) entities: Option<Vec<EntityAttr>>,
}

/// `#[middleware(...)]` options.
#[derive(Debug, Clone, Default)]
pub(crate) struct MiddlewareAttrs {
    pub(crate) name: Option<String>,
    pub(crate) intended_for: Option<IntendedForAttrs>,
}

/// Parse every `#[middleware(...)]` attribute, later values winning.
pub(crate) fn parse_middleware_attrs(attrs: &[Attribute]) -> syn::Result<MiddlewareAttrs> {
    let mut options = MiddlewareAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("middleware") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(syn::Error::new_spanned(&value, "middleware name cannot be empty"));
                }
                options.name = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("intended_for") {
                options.intended_for = Some(parse_intended_for(&meta)?);
                Ok(())
            } else {
                Err(meta.error("unknown middleware attribute, expected `name` or `intended_for`"))
            }
        })?;
    }

    Ok(options)
}

fn parse_intended_for(meta: &ParseNestedMeta<'_>) -> syn::Result<IntendedForAttrs> {
    let mut intended_for = IntendedForAttrs::default();

    meta.parse_nested_meta(|meta| {
        if meta.path.is_ident("methods") {
            let array: ExprArray = meta.value()?.parse()?;
            intended_for.methods = Some(string_array(&array)?);
            Ok(())
        } else if meta.path.is_ident("scope") {
            let value: LitStr = meta.value()?.parse()?;
            let scope = ScopeAttr::parse(&value.value()).ok_or_else(|| {
                syn::Error::new_spanned(
                    &value,
                    format!(
                        "unknown scope: \"{}\". Expected \"instance\" or \"class\"",
                        value.value()
                    ),
                )
            })?;
            intended_for.scope = Some(scope);
            Ok(())
        } else if meta.path.is_ident("entity") {
            let value: LitStr = meta.value()?.parse()?;
            intended_for.entities = Some(vec![EntityAttr::parse(&value.value())]);
            Ok(())
        } else if meta.path.is_ident("entities") {
            let array: ExprArray = meta.value()?.parse()?;
            let entities = string_array(&array)?
                .iter()
                .map(|entity| EntityAttr::parse(entity))
                .collect();
            intended_for.entities = Some(entities);
            Ok(())
        } else {
            Err(meta.error(
                "unknown intended_for option, expected `methods`, `scope`, `entity` or `entities`",
            ))
        }
    })?;

    Ok(intended_for)
}

fn string_array(array: &ExprArray) -> syn::Result<Vec<String>> {
    array
        .elems
        .iter()
        .map(|elem| match elem {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(value) if !value.value().is_empty() => Ok(value.value()),
                _ => Err(syn::Error::new_spanned(elem, "expected a non-empty string literal")),
            },
            _ => Err(syn::Error::new_spanned(elem, "expected a string literal")),
        })
        .collect()
}

/// Convert a type name to `snake_case`.
pub(crate) fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_lowercase().next().unwrap_or(c));
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn snake_case_names() {
        assert_eq!(to_snake_case("Logging"), "logging");
        assert_eq!(to_snake_case("CachesReturnValue"), "caches_return_value");
    }

    #[test]
    fn parse_name_and_intended_for() {
        let attrs: Vec<Attribute> = vec![parse_quote! {
            #[middleware(
                name = "rollback",
                intended_for(methods = ["result", "call"], scope = "instance", entity = "service")
            )]
        }];
        let options = parse_middleware_attrs(&attrs).expect("parse");
        assert_eq!(options.name.as_deref(), Some("rollback"));

        let intended_for = options.intended_for.expect("intended_for");
        assert_eq!(
            intended_for.methods,
            Some(vec!["result".to_string(), "call".to_string()])
        );
        assert_eq!(intended_for.scope, Some(ScopeAttr::Instance));
        assert_eq!(
            intended_for.entities,
            Some(vec![EntityAttr::Builtin("Service")])
        );
    }

    #[test]
    fn parse_custom_entities() {
        let attrs: Vec<Attribute> = vec![parse_quote! {
            #[middleware(intended_for(entities = ["step", "job"]))]
        }];
        let options = parse_middleware_attrs(&attrs).expect("parse");
        let intended_for = options.intended_for.expect("intended_for");
        assert_eq!(
            intended_for.entities,
            Some(vec![
                EntityAttr::Builtin("Step"),
                EntityAttr::Custom("job".to_string())
            ])
        );
        assert!(intended_for.methods.is_none());
        assert!(intended_for.scope.is_none());
    }

    #[test]
    fn reject_unknown_scope() {
        let attrs: Vec<Attribute> = vec![parse_quote! {
            #[middleware(intended_for(scope = "module"))]
        }];
        let err = parse_middleware_attrs(&attrs).expect_err("unknown scope");
        assert!(err.to_string().contains("module"));
    }

    #[test]
    fn reject_unknown_option() {
        let attrs: Vec<Attribute> = vec![parse_quote! {
            #[middleware(priority = 1)]
        }];
        assert!(parse_middleware_attrs(&attrs).is_err());
    }

    #[test]
    fn ignore_other_attributes() {
        let attrs: Vec<Attribute> = vec![parse_quote! { #[derive(Debug)] }];
        let options = parse_middleware_attrs(&attrs).expect("parse");
        assert!(options.name.is_none());
        assert!(options.intended_for.is_none());
    }
}
