use crate::users::models::PreferencesModel;

use super::store::DynKeyValueStore;

pub const CURRENCY_KEY: &str = "currency";
pub const DATE_FORMAT_KEY: &str = "date_format";

///
/// Locally cached display preferences. Once a value is cached it takes
/// precedence over whatever the server reports.
/// 
pub struct PreferenceCache {
    store: DynKeyValueStore,
}

impl PreferenceCache {
    pub fn new(store: DynKeyValueStore) -> Self {
        Self { store }
    }

    pub fn resolve(&self, server: PreferencesModel) -> PreferencesModel {
        PreferencesModel { 
            currency: self.store.get(CURRENCY_KEY).unwrap_or(server.currency), 
            date_format: self.store.get(DATE_FORMAT_KEY).unwrap_or(server.date_format),
        }
    }

    pub fn save(&self, prefs: &PreferencesModel) {
        self.store.set(CURRENCY_KEY, prefs.currency.clone());
        self.store.set(DATE_FORMAT_KEY, prefs.date_format.clone());
    }
}
