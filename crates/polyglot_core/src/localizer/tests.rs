//! Localizer behaviour against in-memory resources and stores

use super::*;
use crate::error::ErrorKind;
use crate::resource::MemoryResourceSource;
use tracing_test::traced_test;

const EN: &str = r#"{
    "variables": {"site_name": "Test Site"},
    "welcome": "Welcome to {{site_name}}",
    "rich": "<b>Bold</b> &amp; <a href=\"/x\">link</a>",
    "items_1": "{{count}} item in {{place}}",
    "items_other": "{{count}} items in {{place}}",
    "only_default_other": "{{count}} fallback"
}"#;

const FR: &str = r#"{
    "variables": {"site_name": "Site de test"},
    "welcome": "Bienvenue sur {{site_name}}",
    "items_un": "{{count}} article",
    "items_other": "{{count}} articles"
}"#;

fn resources() -> MemoryResourceSource {
    MemoryResourceSource::new().with("en", EN).with("fr", FR)
}

fn config(debug: bool) -> LocaleConfig {
    LocaleConfig::default()
        .with_supported_locales(["en", "fr"])
        .with_debug(debug)
}

fn localizer(debug: bool) -> Localizer {
    Localizer::builder(config(debug))
        .resource_source(resources())
        .build()
        .expect("localizer builds")
}

#[test]
fn test_detects_default_on_build() {
    let l = localizer(false);
    assert_eq!(l.current_locale(), Some("en"));
    assert!(l.loaded().contains("en"));
    assert_eq!(l.t("welcome"), "Welcome to Test Site");
}

#[test]
fn test_skipping_detection_leaves_locale_unset() {
    let l = Localizer::builder(config(false))
        .resource_source(resources())
        .detect_on_build(false)
        .build()
        .unwrap();
    assert_eq!(l.current_locale(), None);
    assert_eq!(l.locale(), "en");
    assert!(l.loaded().is_empty());
    assert_eq!(l.format_number(1.0, 2).unwrap_err().kind, ErrorKind::InvalidLocale);
    assert_eq!(l.formatting_rules().unwrap_err().kind, ErrorKind::InvalidLocale);
}

#[test]
fn test_set_active_switches_and_autoloads() {
    let mut l = localizer(false);
    assert_eq!(l.set_active(Some("fr"), false).unwrap(), "fr");
    assert!(l.loaded().contains("fr"));
    assert_eq!(l.t("welcome"), "Bienvenue sur Site de test");
}

#[test]
fn test_unsupported_candidate_falls_back() {
    let mut l = localizer(false);
    assert_eq!(l.set_active(Some("xx"), false).unwrap(), "en");
}

#[test]
fn test_force_accepts_unsupported_locale() {
    let mut l = localizer(false);
    assert_eq!(l.set_active(Some("es"), true).unwrap(), "es");
    assert_eq!(l.current_locale(), Some("es"));
    // no "es" resource: the default one is cached instead
    assert!(!l.loaded().contains("es"));
    assert_eq!(l.t("welcome"), "Translation missing: welcome");
}

#[test]
fn test_forced_empty_locale_is_invalid_in_both_modes() {
    for debug in [false, true] {
        let mut l = localizer(debug);
        let err = l.set_active(Some(""), true).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidLocale);
    }
}

#[test]
fn test_default_locale_is_added_to_supported() {
    let config = LocaleConfig::default()
        .with_default_locale("en")
        .with_supported_locales(["fr"]);
    let mut l = Localizer::builder(config)
        .resource_source(resources())
        .detect_on_build(false)
        .build()
        .unwrap();
    assert!(!l.supported_locales().contains("en"));
    l.set_active(None, false).unwrap();
    assert!(l.supported_locales().contains("en"));
}

#[test]
fn test_request_override_is_used_for_rederivation() {
    let mut l = Localizer::builder(config(false))
        .resource_source(resources())
        .request(RequestSignals::new().with_locale_param("fr"))
        .build()
        .unwrap();
    assert_eq!(l.current_locale(), Some("fr"));

    l.set_request(RequestSignals::new());
    // session now remembers "fr"
    assert_eq!(l.set_active(None, false).unwrap(), "fr");
}

#[test]
fn test_strict_persistence_failure_is_raised() {
    let result = Localizer::builder(config(true).with_cookie(true))
        .resource_source(resources())
        .cookie_store(MemoryStore::new().read_only())
        .build();
    let err = result.err().expect("read-only cookie store fails in strict mode");
    assert_eq!(err.kind, ErrorKind::PersistenceFailure);
    assert_eq!(err.context_value("store"), Some("cookie"));
}

/// Cookie jar that reads the request cookie and writes the response cookie
#[derive(Clone, Default)]
struct SplitCookieJar {
    inbound: Option<String>,
    outbound: std::sync::Arc<std::sync::Mutex<Option<String>>>,
}

impl PreferenceStore for SplitCookieJar {
    fn get(&self, _key: &str) -> Option<String> {
        self.inbound.clone()
    }

    fn set(&mut self, _key: &str, value: &str, _ttl: Option<std::time::Duration>) -> bool {
        *self.outbound.lock().unwrap() = Some(value.to_string());
        true
    }
}

#[test]
fn test_strict_cookie_change_is_accepted_by_split_jar() {
    let jar = SplitCookieJar {
        inbound: Some("en".to_string()),
        ..SplitCookieJar::default()
    };
    let outbound = jar.outbound.clone();
    let mut l = Localizer::builder(config(true).with_cookie(true))
        .resource_source(resources())
        .cookie_store(jar)
        .build()
        .unwrap();

    assert_eq!(l.set_active(Some("fr"), false).unwrap(), "fr");
    assert_eq!(outbound.lock().unwrap().as_deref(), Some("fr"));
    assert!(l.loaded().contains("fr"));
    assert_eq!(l.t("welcome"), "Bienvenue sur Site de test");
}

#[test]
fn test_strict_persistence_failure_keeps_previous_locale() {
    let mut l = Localizer::builder(config(true).with_cookie(true))
        .resource_source(resources())
        .cookie_store(MemoryStore::new().read_only())
        .detect_on_build(false)
        .build()
        .unwrap();

    let err = l.set_active(Some("fr"), false).unwrap_err();
    assert_eq!(err.kind, ErrorKind::PersistenceFailure);
    assert_eq!(l.current_locale(), None);
    assert!(!l.loaded().contains("fr"));
}

#[traced_test]
#[test]
fn test_permissive_persistence_failure_is_logged() {
    let l = Localizer::builder(config(false).with_cookie(true))
        .resource_source(resources())
        .cookie_store(MemoryStore::new().read_only())
        .build()
        .unwrap();
    assert_eq!(l.current_locale(), Some("en"));
    assert!(logs_contain("Failed to set locale in cookie"));
}

#[test]
fn test_translate_modes() {
    let l = localizer(false);
    assert_eq!(l.translate("rich", EscapeMode::Sanitize), "Bold & <a href=\"/x\">link</a>");
    assert_eq!(
        l.translate("rich", EscapeMode::Raw),
        "<b>Bold</b> &amp; <a href=\"/x\">link</a>"
    );
}

#[test]
fn test_missing_key_sentinel_in_both_modes() {
    for debug in [false, true] {
        let l = localizer(debug);
        assert_eq!(l.t("nonexistent_key"), "Translation missing: nonexistent_key");
    }
}

#[test]
fn test_lookup_falls_back_to_default_then_errors() {
    let mut l = localizer(false);
    l.set_active(Some("fr"), false).unwrap();
    // "en" is still cached from build
    assert_eq!(l.lookup("rich").unwrap(), "<b>Bold</b> &amp; <a href=\"/x\">link</a>");
    assert_eq!(l.lookup("welcome").unwrap(), "Bienvenue sur Site de test");
    assert_eq!(l.lookup("nope").unwrap_err().kind, ErrorKind::TranslationNotFound);
}

#[test]
fn test_plural_forms() {
    let mut l = localizer(false);
    let vars = crate::vars! { "place" => "cart" };
    assert_eq!(l.translate_plural("items", 1, &vars).unwrap(), "1 item in cart");
    assert_eq!(l.translate_plural("items", 2, &vars).unwrap(), "2 items in cart");
    assert_eq!(l.translate_plural("items", 0, &vars).unwrap(), "0 items in cart");
}

#[test]
fn test_plural_rule_and_default_fallback() {
    let config = config(false).with_plural_rule("fr", "_un");
    let mut l = Localizer::builder(config).resource_source(resources()).build().unwrap();
    l.set_active(Some("fr"), false).unwrap();

    let none: HashMap<String, String> = HashMap::new();
    assert_eq!(l.translate_plural("items", 1, &none).unwrap(), "1 article");
    assert_eq!(l.translate_plural("only_default", 3, &none).unwrap(), "3 fallback");
    assert_eq!(l.translate_plural("ghost", 3, &none).unwrap(), "Translation not found.");
}

#[test]
fn test_plural_count_overrides_caller_variable() {
    let mut l = localizer(false);
    let mut vars = HashMap::new();
    vars.insert("count".to_string(), 99);
    vars.insert("place".to_string(), 7);
    assert_eq!(l.translate_plural("items", 2, &vars).unwrap(), "2 items in 7");
}

#[test]
fn test_plural_requires_default_resource() {
    let mut l = Localizer::builder(config(false))
        .resource_source(MemoryResourceSource::new().with("fr", FR))
        .detect_on_build(false)
        .build()
        .unwrap();
    let none: HashMap<String, String> = HashMap::new();
    let err = l.translate_plural("items", 2, &none).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ResourceUnavailable);
}

#[test]
fn test_unload_round_trip() {
    let mut l = localizer(false);
    l.set_active(Some("fr"), false).unwrap();
    assert_eq!(l.loaded().len(), 2);

    l.unload("fr").unwrap();
    assert!(!l.loaded().contains("fr"));
    assert!(l.loaded().contains("en"));
}

#[test]
fn test_unload_of_unknown_locale_depends_on_policy() {
    let mut permissive = localizer(false);
    assert!(permissive.unload("de").is_ok());

    let mut strict = localizer(true);
    let err = strict.unload("de").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ResourceUnavailable);
    assert!(err.message.contains("not currently loaded"));
}

#[test]
fn test_malformed_resource_depends_on_policy() {
    let source = || MemoryResourceSource::new().with("en", EN).with("fr", "{invalid json}");

    let mut strict = Localizer::builder(config(true)).resource_source(source()).build().unwrap();
    let err = strict.load_locale("fr").unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedResource);

    let mut permissive = Localizer::builder(config(false)).resource_source(source()).build().unwrap();
    assert_eq!(permissive.load_locale("fr").unwrap(), None);
    assert!(!permissive.loaded().contains("fr"));
}

#[test]
fn test_info_snapshot() {
    let l = localizer(false);
    let info = l.info();
    assert_eq!(info.current_locale.as_deref(), Some("en"));
    assert_eq!(info.supported_locales, vec!["en", "fr"]);
    assert_eq!(info.loaded_locales, vec!["en"]);
    assert_eq!(info.variable_pattern.as_deref(), Some("{{(.*?)}}"));
    assert!(info.session_enabled);
    assert!(!info.cookie_enabled);

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["default_locale"], "en");
}

#[test]
fn test_formatting_through_localizer() {
    let mut l = localizer(false);
    assert_eq!(l.format_number(1234.56, 2).unwrap(), "1,234.56");
    assert_eq!(l.format_currency(1234.56, "USD", true).unwrap(), "$1,234.56");
    assert_eq!(
        l.format_currency(1.0, "INVALID", true).unwrap_err().kind,
        ErrorKind::InvalidArgument
    );

    l.set_active(Some("fr"), false).unwrap();
    let date = NaiveDate::from_ymd_opt(2023, 5, 15).unwrap();
    assert_eq!(l.format_date(date, DateStyle::Long).unwrap(), "15 mai 2023");
    assert_eq!(l.formatting_rules().unwrap().unwrap().decimal_point, ",");
}

#[test]
fn test_unknown_locale_formatting_rules_depend_on_policy() {
    let mut permissive = localizer(false);
    permissive.set_active(Some("C"), true).unwrap();
    assert_eq!(permissive.formatting_rules().unwrap(), None);

    let mut strict = localizer(true);
    strict.set_active(Some("C"), true).unwrap();
    assert_eq!(strict.formatting_rules().unwrap_err().kind, ErrorKind::InvalidArgument);
}

const PERCENT_EN: &str = r#"{
    "variables": {"site_name": "Test Site"},
    "welcome": "Welcome to %site_name%, {{site_name}}",
    "cart_1": "%count% item for %who%",
    "cart_other": "%count% items for %who%"
}"#;

#[test]
fn test_custom_pattern_applies_to_resources_and_plurals() {
    let config = config(false).with_variable_pattern(r"%(\w+)%");
    let mut l = Localizer::builder(config)
        .resource_source(MemoryResourceSource::new().with("en", PERCENT_EN))
        .build()
        .unwrap();

    assert_eq!(l.t("welcome"), "Welcome to Test Site, {{site_name}}");
    assert_eq!(l.info().variable_pattern.as_deref(), Some(r"%(\w+)%"));

    let vars = crate::vars! { "who" => "Ada" };
    assert_eq!(l.translate_plural("cart", 1, &vars).unwrap(), "1 item for Ada");
    assert_eq!(l.translate_plural("cart", 4, &vars).unwrap(), "4 items for Ada");
}

#[test]
fn test_disabled_pattern_leaves_placeholders() {
    let mut l = Localizer::builder(config(false).with_variable_pattern(""))
        .resource_source(resources())
        .build()
        .unwrap();

    assert_eq!(l.t("welcome"), "Welcome to {{site_name}}");
    assert_eq!(l.info().variable_pattern, None);

    let vars = crate::vars! { "place" => "cart" };
    assert_eq!(l.translate_plural("items", 2, &vars).unwrap(), "{{count}} items in {{place}}");
}
