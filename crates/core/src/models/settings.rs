//! Store-wide settings edited from the dashboard and read by the shop.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{ValidationError, link, max_len, non_negative, require};
use crate::types::{CurrencyCode, DeliveryZone, Email, Price};

/// Social profile links shown in the shop footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub youtube: Option<String>,
}

impl SocialLinks {
    /// `(network, url)` pairs for the links that are set.
    #[must_use]
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        [
            ("Facebook", self.facebook.as_deref()),
            ("Instagram", self.instagram.as_deref()),
            ("TikTok", self.tiktok.as_deref()),
            ("YouTube", self.youtube.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, url)| url.filter(|u| !u.trim().is_empty()).map(|u| (name, u)))
        .collect()
    }
}

/// The `/api/store-settings` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    pub store_name: String,
    pub logo: Option<String>,
    pub currency: CurrencyCode,
    /// Overrides the currency's default symbol when set.
    pub currency_symbol: Option<String>,
    pub inside_valley_rate: Decimal,
    pub outside_valley_rate: Decimal,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub custom_domain: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub social: SocialLinks,
    pub under_construction: bool,
}

impl StoreSettings {
    /// Delivery charge for a zone.
    #[must_use]
    pub const fn delivery_charge(&self, zone: DeliveryZone) -> Decimal {
        match zone {
            DeliveryZone::InsideValley => self.inside_valley_rate,
            DeliveryZone::OutsideValley => self.outside_valley_rate,
        }
    }

    /// Symbol shown next to amounts.
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.currency_symbol
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.currency.symbol())
    }

    /// Format an amount with the store's symbol.
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        let price = Price::new(amount, self.currency).display();
        let default_symbol = self.currency.symbol();
        match price.strip_prefix(default_symbol) {
            Some(rest) => format!("{}{rest}", self.symbol()),
            None => price,
        }
    }

    /// Browser title, falling back to the store name.
    #[must_use]
    pub fn page_title(&self) -> &str {
        self.seo_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.store_name)
    }

    /// Comma-separated SEO keywords, trimmed.
    #[must_use]
    pub fn keywords(&self) -> Vec<&str> {
        self.seo_keywords
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Check the settings form before saving.
    ///
    /// # Errors
    ///
    /// Returns the first rule the settings break.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Store name", &self.store_name)?;
        max_len("Store name", &self.store_name, 100)?;
        non_negative("Inside valley rate", self.inside_valley_rate)?;
        non_negative("Outside valley rate", self.outside_valley_rate)?;

        if let Some(title) = present(self.seo_title.as_deref()) {
            max_len("SEO title", title, 70)?;
        }
        if let Some(description) = present(self.seo_description.as_deref()) {
            max_len("SEO description", description, 160)?;
        }
        if let Some(email) = present(self.contact_email.as_deref()) {
            Email::parse(email)
                .map_err(|e| ValidationError::invalid("Contact email", e.to_string()))?;
        }
        if let Some(logo) = present(self.logo.as_deref()) {
            link("Logo", logo)?;
        }
        if let Some(domain) = present(self.custom_domain.as_deref()) {
            validate_domain(domain)?;
        }
        for (network, url) in self.social.present() {
            link(network, url)?;
        }
        Ok(())
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A bare hostname such as `shop.acme.com`.
fn validate_domain(domain: &str) -> Result<(), ValidationError> {
    let labels: Vec<&str> = domain.split('.').collect();
    let label_ok = |label: &&str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if labels.len() < 2 || !labels.iter().all(label_ok) {
        return Err(ValidationError::invalid(
            "Custom domain",
            "must be a hostname like shop.example.com",
        ));
    }
    Ok(())
}

/// A menu link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub url: String,
}

impl NavLink {
    fn validate(&self) -> Result<(), ValidationError> {
        require("Link label", &self.label)?;
        link("Link URL", &self.url)
    }
}

/// The shop header menu (`/api/store-settings/navbar`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavbarSettings {
    pub links: Vec<NavLink>,
    pub show_search: bool,
}

impl NavbarSettings {
    /// # Errors
    ///
    /// Returns an error for a blank label or malformed URL.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.links.iter().try_for_each(NavLink::validate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterColumn {
    pub title: String,
    #[serde(default)]
    pub links: Vec<NavLink>,
}

/// The shop footer (`/api/store-settings/footer`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSettings {
    pub columns: Vec<FooterColumn>,
    pub copyright: Option<String>,
}

impl FooterSettings {
    /// # Errors
    ///
    /// Returns an error for an untitled column or a bad link.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for column in &self.columns {
            require("Column title", &column.title)?;
            column.links.iter().try_for_each(NavLink::validate)?;
        }
        Ok(())
    }
}

/// Tabs of the store settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsTab {
    #[default]
    General,
    Delivery,
    Seo,
    Domains,
}

impl SettingsTab {
    pub const ALL: [Self; 4] = [Self::General, Self::Delivery, Self::Seo, Self::Domains];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Delivery => "delivery",
            Self::Seo => "seo",
            Self::Domains => "domains",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Delivery => "Delivery",
            Self::Seo => "SEO",
            Self::Domains => "Domains",
        }
    }
}

impl fmt::Display for SettingsTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SettingsTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid settings tab: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn settings() -> StoreSettings {
        StoreSettings {
            store_name: "Acme".into(),
            inside_valley_rate: Decimal::new(100, 0),
            outside_valley_rate: Decimal::new(200, 0),
            ..StoreSettings::default()
        }
    }

    #[test]
    fn test_deserialize_partial() {
        let s: StoreSettings =
            serde_json::from_str(r#"{"storeName":"Acme","underConstruction":true,"currency":"USD"}"#)
                .unwrap();
        assert!(s.under_construction);
        assert_eq!(s.currency, CurrencyCode::USD);
        assert_eq!(s.inside_valley_rate, Decimal::ZERO);
    }

    #[test]
    fn test_delivery_charge() {
        let s = settings();
        assert_eq!(s.delivery_charge(DeliveryZone::OutsideValley), Decimal::new(200, 0));
    }

    #[test]
    fn test_symbol_override() {
        let mut s = settings();
        assert_eq!(s.format(Decimal::new(1500, 0)), "Rs. 1,500.00");
        s.currency_symbol = Some("NPR".into());
        assert_eq!(s.format(Decimal::new(1500, 0)), "NPR 1,500.00");
    }

    #[test]
    fn test_validate() {
        assert!(settings().validate().is_ok());

        let mut s = settings();
        s.store_name = String::new();
        assert_eq!(s.validate(), Err(ValidationError::Required("Store name")));

        let mut s = settings();
        s.outside_valley_rate = Decimal::new(-1, 0);
        assert_eq!(s.validate(), Err(ValidationError::Negative("Outside valley rate")));

        let mut s = settings();
        s.contact_email = Some("owner-at-acme".into());
        assert!(s.validate().is_err());

        let mut s = settings();
        s.social.instagram = Some("instagram.com/acme".into());
        assert!(s.validate().is_err());

        let mut s = settings();
        s.custom_domain = Some("shop.acme.com".into());
        assert!(s.validate().is_ok());
        s.custom_domain = Some("https://shop.acme.com".into());
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_title_and_keywords() {
        let mut s = settings();
        assert_eq!(s.page_title(), "Acme");
        s.seo_title = Some("Acme Nepal".into());
        s.seo_keywords = Some("topi, , shawl ".into());
        assert_eq!(s.page_title(), "Acme Nepal");
        assert_eq!(s.keywords(), vec!["topi", "shawl"]);
    }

    #[test]
    fn test_navbar_and_footer() {
        let nav = NavbarSettings {
            links: vec![NavLink {
                label: "Sale".into(),
                url: "/sale".into(),
            }],
            show_search: true,
        };
        assert!(nav.validate().is_ok());

        let footer = FooterSettings {
            columns: vec![FooterColumn {
                title: String::new(),
                links: vec![],
            }],
            copyright: None,
        };
        assert!(footer.validate().is_err());
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!("SEO".parse::<SettingsTab>(), Ok(SettingsTab::Seo));
        assert!("billing".parse::<SettingsTab>().is_err());
    }
}
