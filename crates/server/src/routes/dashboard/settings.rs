//! Store settings: tabbed store form plus the navbar and footer editors.
//!
//! The open tab comes from `?tab=` and is remembered in the session so the
//! screen reopens where the user left it. Saving merges the tab's fields
//! into freshly loaded settings, so tabs never overwrite each other.
//!
//! Menu links are edited as text, one `Label | URL` per line. Footer
//! columns start with a `# Title` line.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::models::{
    FooterColumn, FooterSettings, NavLink, NavbarSettings, SettingsTab, StoreSettings,
};
use nepostore_core::store::StoreEvent;
use nepostore_core::types::CurrencyCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use super::{Chrome, first_notice};
use crate::error::AppError;
use crate::routes::{Ctx, recover, with_param};
use crate::uploads::UploadedForm;
use crate::visitor;

const PATH: &str = "/store-settings";

#[derive(Debug, Default, Deserialize)]
struct SettingsQuery {
    #[serde(default)]
    tab: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct CurrencyOption {
    pub code: &'static str,
    pub symbol: &'static str,
    pub selected: bool,
}

/// Store settings flattened to form values.
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub store_name: String,
    pub logo: String,
    pub currency_symbol: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub facebook: String,
    pub instagram: String,
    pub tiktok: String,
    pub youtube: String,
    pub under_construction: bool,
    pub inside_valley_rate: String,
    pub outside_valley_rate: String,
    pub seo_title: String,
    pub seo_description: String,
    pub seo_keywords: String,
    pub custom_domain: String,
}

impl From<&StoreSettings> for SettingsForm {
    fn from(s: &StoreSettings) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            store_name: s.store_name.clone(),
            logo: text(&s.logo),
            currency_symbol: text(&s.currency_symbol),
            contact_email: text(&s.contact_email),
            contact_phone: text(&s.contact_phone),
            facebook: text(&s.social.facebook),
            instagram: text(&s.social.instagram),
            tiktok: text(&s.social.tiktok),
            youtube: text(&s.social.youtube),
            under_construction: s.under_construction,
            inside_valley_rate: s.inside_valley_rate.to_string(),
            outside_valley_rate: s.outside_valley_rate.to_string(),
            seo_title: text(&s.seo_title),
            seo_description: text(&s.seo_description),
            seo_keywords: text(&s.seo_keywords),
            custom_domain: text(&s.custom_domain),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/settings.html")]
pub struct SettingsTemplate {
    pub chrome: Chrome,
    pub tab: &'static str,
    pub tabs: Vec<TabLink>,
    pub form: SettingsForm,
    pub currencies: Vec<CurrencyOption>,
    pub shop_host: String,
    pub navbar_links: String,
    pub show_search: bool,
    pub footer_columns: String,
    pub copyright: String,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let query: SettingsQuery = ctx.query();
    let tab = match query.tab.as_deref().and_then(|t| t.parse::<SettingsTab>().ok()) {
        Some(tab) => {
            visitor::save_settings_tab(&ctx.session, tab).await?;
            tab
        }
        None => visitor::settings_tab(&ctx.session).await?,
    };

    let (settings, navbar, footer) = tokio::join!(
        ctx.api.store_settings(),
        ctx.api.navbar_settings(),
        ctx.api.footer_settings(),
    );
    let (settings, settings_err) = recover(settings, "store settings")?;
    let (navbar, navbar_err) = recover(navbar, "navbar")?;
    let (footer, footer_err) = recover(footer, "footer")?;

    let shop_host = ctx.api.tenant().map_or_else(String::new, |tenant| {
        format!("{tenant}.{}", ctx.state.config().base_domain)
    });

    Ok(SettingsTemplate {
        chrome: Chrome::new(&ctx, "Store settings")
            .with_notice(first_notice([settings_err, navbar_err, footer_err])),
        tab: tab.as_str(),
        tabs: SettingsTab::ALL
            .into_iter()
            .map(|t| TabLink {
                label: t.label(),
                href: with_param(PATH, "tab", t.as_str()),
                active: t == tab,
            })
            .collect(),
        form: SettingsForm::from(&settings),
        currencies: CurrencyCode::ALL
            .into_iter()
            .map(|c| CurrencyOption {
                code: c.code(),
                symbol: c.symbol(),
                selected: c == settings.currency,
            })
            .collect(),
        shop_host,
        navbar_links: format_links(&navbar.links),
        show_search: navbar.show_search,
        footer_columns: format_columns(&footer.columns),
        copyright: footer.copyright.unwrap_or_default(),
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    let tab = form
        .text("tab")
        .and_then(|t| t.parse::<SettingsTab>().ok())
        .unwrap_or_default();
    let back = with_param(PATH, "tab", tab.as_str());

    let outcome = match form.text("action") {
        Some("save") => save_settings(&ctx, &form, tab).await,
        Some("navbar") => save_navbar(&ctx, &form).await,
        Some("footer") => save_footer(&ctx, &form).await,
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(&back, outcome)
}

async fn save_settings(ctx: &Ctx, form: &UploadedForm, tab: SettingsTab) -> Result<String, AppError> {
    let mut settings = ctx.api.store_settings().await?;
    apply_tab(&mut settings, form, tab)?;
    settings.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;
    ctx.api.save_store_settings(&settings).await?;
    ctx.publish(|tenant| StoreEvent::StoreSettingsUpdated { tenant })
        .await;
    Ok(format!("{} settings saved", tab.label()))
}

async fn save_navbar(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let navbar = NavbarSettings {
        links: parse_links(form.text("links").unwrap_or_default())?,
        show_search: form.text("show_search").is_some(),
    };
    navbar.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;
    ctx.api.save_navbar_settings(&navbar).await?;
    ctx.publish(|tenant| StoreEvent::NavbarSettingsUpdated { tenant })
        .await;
    Ok("Navigation saved".to_string())
}

async fn save_footer(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let footer = FooterSettings {
        columns: parse_columns(form.text("columns").unwrap_or_default())?,
        copyright: form.text("copyright").map(String::from),
    };
    footer.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;
    ctx.api.save_footer_settings(&footer).await?;
    ctx.publish(|tenant| StoreEvent::FooterSettingsUpdated { tenant })
        .await;
    Ok("Footer saved".to_string())
}

/// Copy one tab's fields into `settings`. Fields of other tabs are untouched.
fn apply_tab(settings: &mut StoreSettings, form: &UploadedForm, tab: SettingsTab) -> Result<(), AppError> {
    let text = |name: &str| form.text(name).map(String::from);
    match tab {
        SettingsTab::General => {
            settings.store_name = form.text("store_name").unwrap_or_default().to_string();
            settings.logo = text("logo");
            if let Some(code) = form.text("currency") {
                settings.currency = code.parse().map_err(AppError::BadRequest)?;
            }
            settings.currency_symbol = text("currency_symbol");
            settings.contact_email = text("contact_email");
            settings.contact_phone = text("contact_phone");
            settings.social.facebook = text("facebook");
            settings.social.instagram = text("instagram");
            settings.social.tiktok = text("tiktok");
            settings.social.youtube = text("youtube");
            settings.under_construction = form.text("under_construction").is_some();
        }
        SettingsTab::Delivery => {
            settings.inside_valley_rate = rate(form, "inside_valley_rate", "Inside valley rate")?;
            settings.outside_valley_rate = rate(form, "outside_valley_rate", "Outside valley rate")?;
        }
        SettingsTab::Seo => {
            settings.seo_title = text("seo_title");
            settings.seo_description = text("seo_description");
            settings.seo_keywords = text("seo_keywords");
        }
        SettingsTab::Domains => {
            settings.custom_domain = text("custom_domain").map(|d| d.to_lowercase());
        }
    }
    Ok(())
}

fn rate(form: &UploadedForm, field: &str, label: &str) -> Result<Decimal, AppError> {
    form.text(field)
        .unwrap_or("0")
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{label} must be a number")))
}

fn parse_link(line: &str) -> Result<NavLink, AppError> {
    let (label, url) = line
        .split_once('|')
        .ok_or_else(|| AppError::BadRequest(format!("'{line}' should look like Label | URL")))?;
    Ok(NavLink {
        label: label.trim().to_string(),
        url: url.trim().to_string(),
    })
}

fn parse_links(text: &str) -> Result<Vec<NavLink>, AppError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_link)
        .collect()
}

fn parse_columns(text: &str) -> Result<Vec<FooterColumn>, AppError> {
    let mut columns: Vec<FooterColumn> = Vec::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(title) = line.strip_prefix('#') {
            columns.push(FooterColumn {
                title: title.trim().to_string(),
                links: Vec::new(),
            });
            continue;
        }
        let column = columns.last_mut().ok_or_else(|| {
            AppError::BadRequest("Start each footer column with a # Title line".to_string())
        })?;
        column.links.push(parse_link(line)?);
    }
    Ok(columns)
}

fn format_links(links: &[NavLink]) -> String {
    links
        .iter()
        .map(|link| format!("{} | {}", link.label, link.url))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_columns(columns: &[FooterColumn]) -> String {
    columns
        .iter()
        .map(|column| {
            let mut block = format!("# {}", column.title);
            if !column.links.is_empty() {
                block.push('\n');
                block.push_str(&format_links(&column.links));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_links() {
        let links = parse_links("Home | /\n\n  Sale|/summer-sale  \n").unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].label, "Sale");
        assert_eq!(links[1].url, "/summer-sale");
        assert!(parse_links("no separator").is_err());
    }

    #[test]
    fn test_columns_round_trip_through_text() {
        let text = "# Shop\nAll | /\nSale | /sale\n\n# Help\nContact | https://acme.com/contact";
        let columns = parse_columns(text).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].links.len(), 2);
        assert_eq!(format_columns(&columns), text);
        assert!(parse_columns("Orphan | /x").is_err());
    }

    #[test]
    fn test_apply_tab_only_touches_its_fields() {
        let mut settings = StoreSettings {
            store_name: "Acme".into(),
            seo_title: Some("Keep me".into()),
            ..StoreSettings::default()
        };
        let form = UploadedForm::from_urlencoded(
            b"inside_valley_rate=100&outside_valley_rate=150.5&store_name=Ignored",
        );
        apply_tab(&mut settings, &form, SettingsTab::Delivery).unwrap();
        assert_eq!(settings.inside_valley_rate, Decimal::new(100, 0));
        assert_eq!(settings.outside_valley_rate, Decimal::new(1505, 1));
        assert_eq!(settings.store_name, "Acme");
        assert_eq!(settings.seo_title.as_deref(), Some("Keep me"));
    }

    #[test]
    fn test_apply_general_tab_checkbox() {
        let mut settings = StoreSettings {
            under_construction: true,
            ..StoreSettings::default()
        };
        let form = UploadedForm::from_urlencoded(b"store_name=Acme&currency=usd");
        apply_tab(&mut settings, &form, SettingsTab::General).unwrap();
        assert!(!settings.under_construction);
        assert_eq!(settings.currency, CurrencyCode::USD);
        assert!(settings.logo.is_none());
    }

    #[test]
    fn test_bad_rate() {
        let mut settings = StoreSettings::default();
        let form = UploadedForm::from_urlencoded(b"inside_valley_rate=free");
        let err = apply_tab(&mut settings, &form, SettingsTab::Delivery).unwrap_err();
        assert_eq!(err.user_message(), "Inside valley rate must be a number");
    }
}
