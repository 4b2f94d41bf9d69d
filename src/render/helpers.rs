//! Template helpers
//!
//! Case conversions used to turn group, version and kind names into Rust
//! identifiers inside templates.

use handlebars::Handlebars;
use heck::{ToSnakeCase, ToUpperCamelCase};

/// Uppercase the first character
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Register every helper on a registry
pub fn register(handlebars: &mut Handlebars<'static>) {
    handlebars.register_helper("upper", Box::new(upper_helper));
    handlebars.register_helper("lower", Box::new(lower_helper));
    handlebars.register_helper("snake", Box::new(snake_helper));
    handlebars.register_helper("camel", Box::new(camel_helper));
}

fn param_str<'a>(h: &'a handlebars::Helper) -> &'a str {
    h.param(0).and_then(|v| v.value().as_str()).unwrap_or("")
}

fn upper_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write(&upper_first(param_str(h)))?;
    Ok(())
}

fn lower_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write(&lower_first(param_str(h)))?;
    Ok(())
}

/// `my-group.io` -> `my_group_io`, `ClusterTestType` -> `cluster_test_type`
fn snake_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write(&param_str(h).to_snake_case())?;
    Ok(())
}

/// `my-group.io` -> `MyGroupIo`
fn camel_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write(&param_str(h).to_upper_camel_case())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_letter_case() {
        assert_eq!(upper_first("testType"), "TestType");
        assert_eq!(lower_first("TestType"), "testType");
        assert_eq!(upper_first(""), "");
    }

    #[test]
    fn test_helpers_render() {
        let mut hb = Handlebars::new();
        register(&mut hb);
        let out = hb
            .render_template(
                "{{lower kind}} {{snake kind}} {{camel group}} {{upper version}}",
                &serde_json::json!({"kind": "ClusterTestType", "group": "my-group.io", "version": "v1"}),
            )
            .unwrap();
        assert_eq!(out, "clusterTestType cluster_test_type MyGroupIo V1");
    }
}
