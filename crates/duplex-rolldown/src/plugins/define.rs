//! Compile-time constant substitution for `define` entries.

use std::borrow::Cow;
use std::ops::Range;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use regex::{Captures, Regex};
use rolldown_plugin::{
    HookTransformArgs, HookTransformOutput, HookTransformReturn, HookUsage, Plugin,
    SharedTransformPluginContext,
};
use tracing::trace;

/// Dotted identifier chains such as `process.env.NODE_ENV`.
static IDENT_CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*").expect("valid identifier regex")
});

const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

#[derive(Debug, Clone)]
pub struct DefinePlugin {
    defines: Arc<IndexMap<String, String>>,
}

impl DefinePlugin {
    pub fn new(defines: IndexMap<String, String>) -> Self {
        Self {
            defines: Arc::new(defines),
        }
    }
}

/// Replace whole identifier chains equal to a define key, or starting with
/// one followed by a property access. Property accesses on other values
/// (`obj.KEY`) are left alone, and so are string literals, template text and
/// comments. Expressions inside `${...}` are replaced. Regex literals are not
/// recognised, so a quote inside one can hide the code after it on that line.
/// Returns `None` when nothing changed.
pub fn replace_defines(code: &str, defines: &IndexMap<String, String>) -> Option<String> {
    if defines.is_empty() {
        return None;
    }

    let literals = literal_spans(code);
    let mut changed = false;
    let replaced = IDENT_CHAIN.replace_all(code, |caps: &Captures<'_>| {
        let Some(chain) = caps.get(0) else {
            return String::new();
        };
        let text = chain.as_str();
        if code[..chain.start()].ends_with('.') || in_spans(&literals, chain.start()) {
            return text.to_string();
        }
        for (key, value) in defines {
            if text == key {
                changed = true;
                return value.clone();
            }
            let is_prefix = text
                .strip_prefix(key.as_str())
                .is_some_and(|rest| rest.starts_with('.'));
            if is_prefix {
                changed = true;
                return format!("{value}{}", &text[key.len()..]);
            }
        }
        text.to_string()
    });

    changed.then(|| replaced.into_owned())
}

/// Byte ranges of string literals, template text and comments, in order.
fn literal_spans(code: &str) -> Vec<Range<usize>> {
    let bytes = code.as_bytes();
    let mut spans = Vec::new();
    // open `${` expressions, each with its own brace depth
    let mut templates: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = code[i..].find('\n').map_or(bytes.len(), |n| i + n);
                spans.push(i..end);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = code[i + 2..].find("*/").map_or(bytes.len(), |n| i + n + 4);
                spans.push(i..end);
                i = end;
            }
            quote @ (b'\'' | b'"') => {
                let end = scan_quoted(bytes, i + 1, quote);
                spans.push(i..end);
                i = end;
            }
            b'`' => i = scan_template(bytes, i, &mut spans, &mut templates),
            b'{' => {
                if let Some(depth) = templates.last_mut() {
                    *depth += 1;
                }
                i += 1;
            }
            b'}' => match templates.last().copied() {
                Some(0) => {
                    templates.pop();
                    i = scan_template(bytes, i, &mut spans, &mut templates);
                }
                Some(_) => {
                    if let Some(depth) = templates.last_mut() {
                        *depth -= 1;
                    }
                    i += 1;
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }
    spans
}

fn scan_quoted(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Scan template text from the opening backtick (or the `}` closing an
/// expression) up to the closing backtick or the next `${`.
fn scan_template(
    bytes: &[u8],
    start: usize,
    spans: &mut Vec<Range<usize>>,
    templates: &mut Vec<usize>,
) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                spans.push(start..i + 1);
                return i + 1;
            }
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                spans.push(start..i);
                templates.push(0);
                return i + 2;
            }
            _ => i += 1,
        }
    }
    spans.push(start..bytes.len());
    bytes.len()
}

fn in_spans(spans: &[Range<usize>], pos: usize) -> bool {
    let idx = spans.partition_point(|span| span.end <= pos);
    spans.get(idx).is_some_and(|span| span.start <= pos)
}

fn is_script(id: &str) -> bool {
    if id.starts_with('\0') {
        return false;
    }
    let path = id.split(['?', '#']).next().unwrap_or(id);
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

impl Plugin for DefinePlugin {
    fn name(&self) -> Cow<'static, str> {
        "duplex:define".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Transform
    }

    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let id = args.id.to_string();
        let code = args.code.to_string();
        let defines = Arc::clone(&self.defines);

        async move {
            if !is_script(&id) || id.contains("/node_modules/") {
                return Ok(None);
            }
            let Some(code) = replace_defines(&code, &defines) else {
                return Ok(None);
            };
            trace!(id = %id, "applied define substitutions");
            Ok(Some(HookTransformOutput {
                code: Some(code),
                map: None,
                side_effects: None,
                module_type: None,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defines(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_identifiers_and_chains() {
        let defines = defines(&[("__API__", "\"/api\""), ("process.env.MODE", "\"production\"")]);
        let code = "fetch(__API__ + '/users'); if (process.env.MODE === 'x') {}";
        assert_eq!(
            replace_defines(code, &defines).unwrap(),
            "fetch(\"/api\" + '/users'); if (\"production\" === 'x') {}"
        );
    }

    #[test]
    fn leaves_partial_matches() {
        let defines = defines(&[("__API__", "1"), ("DEBUG", "false")]);
        assert_eq!(replace_defines("const __API__URL = obj.DEBUG;", &defines), None);
        assert_eq!(replace_defines("DEBUGGER; x.y.DEBUG", &defines), None);
    }

    #[test]
    fn replaces_prefix_of_longer_chain() {
        let defines = defines(&[("CONFIG", "{\"a\":1}")]);
        assert_eq!(replace_defines("CONFIG.a", &defines).unwrap(), "{\"a\":1}.a");
    }

    #[test]
    fn strings_and_comments_are_left_alone() {
        let defines = defines(&[("process.env.NODE_ENV", "\"production\"")]);
        let code = concat!(
            "const label = \"process.env.NODE_ENV\";\n",
            "const other = 'process.env.NODE_ENV';\n",
            "// process.env.NODE_ENV in a comment\n",
            "/* process.env.NODE_ENV */\n",
            "const mode = process.env.NODE_ENV;\n",
        );
        let out = replace_defines(code, &defines).unwrap();
        assert_eq!(out.matches("process.env.NODE_ENV").count(), 4);
        assert!(out.ends_with("const mode = \"production\";\n"));
    }

    #[test]
    fn template_expressions_are_replaced_but_not_template_text() {
        let defines = defines(&[("__API__", "\"/api\"")]);
        let code = "const u = `__API__ is ${__API__ + `/${ {a: __API__}.a }`}`; __API__";
        assert_eq!(
            replace_defines(code, &defines).unwrap(),
            "const u = `__API__ is ${\"/api\" + `/${ {a: \"/api\"}.a }`}`; \"/api\""
        );
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let defines = defines(&[("DEBUG", "false")]);
        let code = r#"const s = "say \"DEBUG\" now"; DEBUG"#;
        assert_eq!(
            replace_defines(code, &defines).unwrap(),
            r#"const s = "say \"DEBUG\" now"; false"#
        );
    }

    #[test]
    fn only_scripts_are_transformed() {
        assert!(is_script("/src/main.ts"));
        assert!(is_script("/src/app.jsx?import"));
        assert!(!is_script("/src/style.css"));
        assert!(!is_script("\0duplex:noop-entry.html"));
    }
}
