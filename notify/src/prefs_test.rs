use super::*;

#[test]
fn memory_preferences_set_get_remove() {
    let mut prefs = MemoryPreferences::new();
    assert_eq!(prefs.get(EMAIL_KEY), None);

    prefs.set(EMAIL_KEY, "a@b.c");
    assert_eq!(prefs.get(EMAIL_KEY).as_deref(), Some("a@b.c"));

    prefs.remove(EMAIL_KEY);
    assert_eq!(prefs.get(EMAIL_KEY), None);
}

#[test]
fn borrowed_store_writes_through() {
    fn remember<P: PreferenceStore>(mut store: P) {
        store.set("k", "v");
    }

    let mut prefs = MemoryPreferences::new();
    remember(&mut prefs);
    assert_eq!(prefs.get("k").as_deref(), Some("v"));
}
