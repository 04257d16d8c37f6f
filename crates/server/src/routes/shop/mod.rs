//! Storefront screens for a tenant's shop.
//!
//! Every page renders inside the shop layout, built from the tenant's
//! cached store settings, navbar and footer. Local links go through
//! [`Ctx::href`] so `?tenant=` survives navigation on local hosts.

pub mod catalog;
pub mod checkout;
pub mod construction;
pub mod wishlist;

use std::sync::Arc;

use nepostore_core::models::{FooterSettings, NavLink, NavbarSettings, Product, StoreSettings};
use nepostore_core::listing::ListQuery;
use nepostore_core::visitor::Wishlist;
use tracing::warn;

use super::{Ctx, Toast};
use crate::error::AppError;
use crate::visitor;

/// Display data for a link.
#[derive(Debug, Clone)]
pub struct LinkView {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone)]
pub struct FooterColumnView {
    pub title: String,
    pub links: Vec<LinkView>,
}

/// Layout data shared by every shop page.
#[derive(Debug, Clone)]
pub struct ShopChrome {
    pub title: String,
    pub store_name: String,
    pub logo: Option<String>,
    pub description: String,
    pub keywords: String,
    pub home_href: String,
    pub checkout_href: String,
    pub wishlist_href: String,
    pub nav: Vec<LinkView>,
    pub show_search: bool,
    pub search: String,
    pub footer_columns: Vec<FooterColumnView>,
    pub copyright: String,
    pub social: Vec<LinkView>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub cart_count: u32,
    pub wishlist_count: usize,
    pub toast: Option<Toast>,
}

impl ShopChrome {
    /// Build the layout for a page titled `title`; `None` uses the store's
    /// SEO title.
    ///
    /// # Errors
    ///
    /// Returns an error when the session cannot be read.
    pub async fn load(ctx: &Ctx, title: Option<&str>) -> Result<Self, AppError> {
        let settings = ctx.shop_settings()?;
        let store = ctx.state.settings();
        let (navbar, footer, cart, wishlist) = tokio::join!(
            store.navbar(&ctx.api),
            store.footer(&ctx.api),
            visitor::cart(&ctx.session),
            visitor::wishlist(&ctx.session),
        );
        let navbar = navbar.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load navbar");
            Arc::new(NavbarSettings::default())
        });
        let footer = footer.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load footer");
            Arc::new(FooterSettings::default())
        });

        let search: ListQuery = ctx.query();
        Ok(Self {
            title: title.map_or_else(
                || settings.page_title().to_string(),
                |t| format!("{t} | {}", settings.store_name),
            ),
            store_name: settings.store_name.clone(),
            logo: settings.logo.clone().filter(|l| !l.trim().is_empty()),
            description: settings.seo_description.clone().unwrap_or_default(),
            keywords: settings.keywords().join(", "),
            home_href: ctx.href("/"),
            checkout_href: ctx.href("/checkout"),
            wishlist_href: ctx.href("/wishlist"),
            nav: links(ctx, &navbar.links),
            show_search: navbar.show_search,
            search: search.q.unwrap_or_default(),
            footer_columns: footer
                .columns
                .iter()
                .map(|column| FooterColumnView {
                    title: column.title.clone(),
                    links: links(ctx, &column.links),
                })
                .collect(),
            copyright: footer
                .copyright
                .clone()
                .unwrap_or_else(|| format!("© {}", settings.store_name)),
            social: settings
                .social
                .present()
                .into_iter()
                .map(|(label, url)| LinkView {
                    label: label.to_string(),
                    href: url.to_string(),
                })
                .collect(),
            contact_email: settings.contact_email.clone(),
            contact_phone: settings.contact_phone.clone(),
            cart_count: cart?.item_count(),
            wishlist_count: wishlist?.len(),
            toast: ctx.toast(),
        })
    }
}

fn links(ctx: &Ctx, links: &[NavLink]) -> Vec<LinkView> {
    links
        .iter()
        .map(|link| LinkView {
            label: link.label.clone(),
            href: if link.url.starts_with('/') {
                ctx.href(&link.url)
            } else {
                link.url.clone()
            },
        })
        .collect()
}

/// A product tile.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub href: String,
    pub image: Option<String>,
    pub price: String,
    pub compare_at: Option<String>,
    pub discount: Option<u32>,
    pub in_stock: bool,
    pub in_wishlist: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(ctx: &Ctx, product: &Product, settings: &StoreSettings, wishlist: &Wishlist) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            href: ctx.href(&product_path(product)),
            image: product.primary_image().map(String::from),
            price: settings.format(product.selling_price),
            compare_at: product
                .compare_at(settings.currency)
                .map(|p| settings.format(p.amount)),
            discount: product.discount_percent(),
            in_stock: product.in_stock(),
            in_wishlist: wishlist.contains(&product.id),
        }
    }
}

/// Shop path of a product.
#[must_use]
pub fn product_path(product: &Product) -> String {
    format!("/product/{}", urlencoding::encode(product.id.as_str()))
}

/// Cards for the active products among `products`.
pub(crate) fn cards<'a>(
    ctx: &Ctx,
    products: impl IntoIterator<Item = &'a Product>,
    settings: &StoreSettings,
    wishlist: &Wishlist,
) -> Vec<ProductCard> {
    products
        .into_iter()
        .filter(|p| p.is_active())
        .map(|p| ProductCard::new(ctx, p, settings, wishlist))
        .collect()
}
