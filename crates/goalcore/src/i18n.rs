use std::collections::HashMap;

use fluent_templates::{
    fluent_bundle::{FluentArgs, FluentValue},
    static_loader, Loader,
};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

use crate::core::config;

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "en",
    };
}

/// Supported languages (code, human-readable name).
pub static SUPPORTED_LANGS: &[(&str, &str)] = &[("en", "English"), ("ru", "Русский")];

/// Language used when the sender's one is unknown or unsupported.
static DEFAULT_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| {
    is_language_supported(&config::DEFAULT_LANG)
        .unwrap_or("en")
        .parse()
        .unwrap_or_default()
});

/// Fluent wraps interpolated values in Unicode isolation marks; Telegram shows them as garbage.
const ISOLATION_MARKS: [char; 2] = ['\u{2068}', '\u{2069}'];

/// Picks the bundle for a Telegram `language_code` (e.g. `ru`, `en-GB`), falling back to the default.
pub fn lang_from_code(code: Option<&str>) -> LanguageIdentifier {
    code.and_then(is_language_supported)
        .and_then(|c| c.parse().ok())
        .unwrap_or_else(|| DEFAULT_LANG.clone())
}

/// Returns a localized string for the given key.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t(lang: &LanguageIdentifier, key: &str) -> String {
    let text = LOCALES
        .lookup(lang, key)
        .unwrap_or_else(|| LOCALES.lookup(&DEFAULT_LANG, key).unwrap_or_else(|| key.to_string()));
    text.replace("\\n", "\n")
}

/// Returns a localized string with arguments for interpolation.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t_args(lang: &LanguageIdentifier, key: &str, args: &FluentArgs) -> String {
    let args_map: HashMap<String, FluentValue> = args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();

    let text = LOCALES.lookup_with_args(lang, key, &args_map).unwrap_or_else(|| {
        LOCALES
            .lookup_with_args(&DEFAULT_LANG, key, &args_map)
            .unwrap_or_else(|| key.to_string())
    });
    text.replace("\\n", "\n").replace(ISOLATION_MARKS, "")
}

/// Checks if a language code is supported by the bot.
/// Returns the normalized language code if supported, None otherwise.
pub fn is_language_supported(code: &str) -> Option<&'static str> {
    // "en-US" -> "en", "ru-RU" -> "ru"
    let normalized = code.split(['-', '_']).next().unwrap_or(code).to_lowercase();

    SUPPORTED_LANGS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(&normalized))
        .map(|(c, _)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_known_translation() {
        let ru = lang_from_code(Some("ru"));
        let en = lang_from_code(Some("en"));

        assert_eq!(t(&ru, "unknown-command"), "Неизвестная команда");
        assert_eq!(t(&en, "unknown-command"), "Unknown command");
    }

    #[test]
    fn converts_newlines() {
        let en = lang_from_code(Some("en"));
        let text = t(&en, "help-commands");

        assert!(text.contains('\n'));
        assert!(!text.contains("\\n"));
        assert!(text.contains("/create"));
    }

    #[test]
    fn interpolates_without_isolation_marks() {
        let en = lang_from_code(Some("en"));
        let mut args = FluentArgs::new();
        args.set("code", "AB12CD34");

        assert_eq!(t_args(&en, "verification-code", &args), "Verification code: AB12CD34");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        let en = lang_from_code(None);
        assert_eq!(t(&en, "no-such-key"), "no-such-key");
    }

    #[test]
    fn test_is_language_supported() {
        assert_eq!(is_language_supported("en"), Some("en"));
        assert_eq!(is_language_supported("ru"), Some("ru"));

        // Variants normalize to the base language
        assert_eq!(is_language_supported("en-GB"), Some("en"));
        assert_eq!(is_language_supported("ru-RU"), Some("ru"));
        assert_eq!(is_language_supported("EN"), Some("en"));

        assert_eq!(is_language_supported("es"), None);
        assert_eq!(is_language_supported("unknown"), None);
    }
}
