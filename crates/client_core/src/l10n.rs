use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

/// Renders UI templates in a language. `{}` placeholders are filled with
/// `args` in order.
pub trait Translator: Send + Sync {
    fn translate(&self, lang: &str, template: &str, args: &[&str]) -> String;
}

pub struct Untranslated;

impl Translator for Untranslated {
    fn translate(&self, _lang: &str, template: &str, args: &[&str]) -> String {
        fill(template, args)
    }
}

/// In-memory template table; falls back to the template itself.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    entries: HashMap<(String, String), String>,
}

impl Catalog {
    pub fn insert(
        &mut self,
        lang: impl Into<String>,
        template: impl Into<String>,
        translation: impl Into<String>,
    ) {
        self.entries
            .insert((lang.into(), template.into()), translation.into());
    }
}

impl Translator for Catalog {
    fn translate(&self, lang: &str, template: &str, args: &[&str]) -> String {
        let key = (lang.to_string(), template.to_string());
        let translated = self.entries.get(&key).map_or(template, String::as_str);
        fill(translated, args)
    }
}

pub fn fill(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        out.push_str(args.next().copied().unwrap_or("{}"));
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
