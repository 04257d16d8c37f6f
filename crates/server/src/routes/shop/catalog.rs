//! Product list, custom pages, product detail and category listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::listing::{ListQuery, Listable};
use nepostore_core::models::{Page, PageSection, Product, StoreSettings};
use nepostore_core::types::{CategoryId, ProductId};
use nepostore_core::visitor::Wishlist;
use tracing::{debug, instrument, warn};

use super::{ProductCard, ShopChrome, cards, product_path};
use crate::error::AppError;
use crate::routes::Ctx;
use crate::uploads::UploadedForm;
use crate::visitor;

/// Heading for products without a section.
const UNSECTIONED: &str = "More products";

/// Recently viewed products shown under a product.
const RECENT_STRIP: usize = 4;

#[derive(Debug, Clone)]
pub struct ProductGroup {
    pub title: String,
    pub products: Vec<ProductCard>,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/products.html")]
pub struct ProductsTemplate {
    pub chrome: ShopChrome,
    pub heading: String,
    pub groups: Vec<ProductGroup>,
}

/// A page section as the shop renders it.
#[derive(Debug, Clone, Default)]
pub struct BlockView {
    pub kind: &'static str,
    pub heading: String,
    pub subheading: String,
    pub image: String,
    pub cta_label: String,
    pub cta_href: String,
    pub paragraphs: Vec<String>,
    pub products: Vec<ProductCard>,
    pub url: String,
    pub alt: String,
    pub link: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/custom_page.html")]
pub struct CustomPageTemplate {
    pub chrome: ShopChrome,
    pub title: String,
    pub blocks: Vec<BlockView>,
}

#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub card: ProductCard,
    pub description: Vec<String>,
    pub images: Vec<String>,
    pub quantity: i64,
    pub section: Option<String>,
    pub section_href: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/product.html")]
pub struct ProductTemplate {
    pub chrome: ShopChrome,
    pub product: ProductDetailView,
    pub action: String,
    pub recently_viewed: Vec<ProductCard>,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/category.html")]
pub struct CategoryTemplate {
    pub chrome: ShopChrome,
    pub name: String,
    pub image: Option<String>,
    pub products: Vec<ProductCard>,
}

/// `/` lists every product by section; `/:slug` shows a published custom
/// page with that slug, or the products of the matching section.
#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let slug = ctx.params.get("slug").map(String::from);

    if let Some(slug) = slug.as_deref() {
        match ctx.api.page_by_slug(slug).await {
            Ok(Some(page)) => return custom_page(ctx, page).await,
            Ok(None) => debug!(slug, "No custom page, filtering by section"),
            Err(err) => warn!(slug, error = %err, "Failed to load custom pages"),
        }
    }

    let settings = ctx.shop_settings()?;
    let (products, wishlist) = tokio::join!(ctx.api.list_products(), visitor::wishlist(&ctx.session));
    let (products, wishlist) = (products?, wishlist?);
    let query: ListQuery = ctx.query();
    let needle = query.needle();

    let visible: Vec<&Product> = products
        .iter()
        .filter(|p| slug.as_deref().is_none_or(|s| p.in_section(s)))
        .filter(|p| needle.as_deref().is_none_or(|n| p.matches(n)))
        .collect();

    let heading = match (&slug, &needle) {
        (_, Some(needle)) => format!("Results for \"{needle}\""),
        (Some(slug), None) => visible
            .iter()
            .find_map(|p| p.section.clone())
            .unwrap_or_else(|| slug.replace('-', " ")),
        (None, None) => "Shop".to_string(),
    };

    let groups = group_by_section(&visible)
        .into_iter()
        .map(|(title, products)| ProductGroup {
            title,
            products: cards(&ctx, products, settings, &wishlist),
        })
        .filter(|group| !group.products.is_empty())
        .collect();

    Ok(ProductsTemplate {
        chrome: ShopChrome::load(&ctx, slug.as_deref().map(|_| heading.as_str())).await?,
        heading,
        groups,
    }
    .into_response())
}

/// Products grouped by section name, in first-seen order.
fn group_by_section<'a>(products: &[&'a Product]) -> Vec<(String, Vec<&'a Product>)> {
    let mut groups: Vec<(String, Vec<&'a Product>)> = Vec::new();
    for product in products {
        let title = product
            .section
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNSECTIONED);
        match groups.iter_mut().find(|(t, _)| t == title) {
            Some((_, members)) => members.push(product),
            None => groups.push((title.to_string(), vec![product])),
        }
    }
    groups
}

async fn custom_page(ctx: Ctx, page: Page) -> Result<Response, AppError> {
    let settings = ctx.shop_settings()?;
    let needs_products = page
        .sections
        .iter()
        .any(|s| matches!(s, PageSection::ProductGrid { .. }));
    let products = if needs_products {
        ctx.api.list_products().await?
    } else {
        Vec::new()
    };
    let wishlist = visitor::wishlist(&ctx.session).await?;

    let blocks = page
        .sections
        .iter()
        .map(|section| block(&ctx, section, &products, settings, &wishlist))
        .collect();

    Ok(CustomPageTemplate {
        chrome: ShopChrome::load(&ctx, Some(&page.title)).await?,
        title: page.title,
        blocks,
    }
    .into_response())
}

fn block(
    ctx: &Ctx,
    section: &PageSection,
    products: &[Product],
    settings: &StoreSettings,
    wishlist: &Wishlist,
) -> BlockView {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let local = |url: &str| {
        if url.starts_with('/') {
            ctx.href(url)
        } else {
            url.to_string()
        }
    };
    let base = BlockView {
        kind: section.kind().as_str(),
        ..BlockView::default()
    };

    match section {
        PageSection::Hero {
            heading,
            subheading,
            image,
            cta_label,
            cta_url,
        } => BlockView {
            heading: heading.clone(),
            subheading: text(subheading),
            image: text(image),
            cta_label: text(cta_label),
            cta_href: cta_url.as_deref().map(local).unwrap_or_default(),
            ..base
        },
        PageSection::Text { heading, body } => BlockView {
            heading: text(heading),
            paragraphs: paragraphs(body),
            ..base
        },
        PageSection::ProductGrid {
            heading,
            section,
            limit,
        } => {
            let picked = products
                .iter()
                .filter(|p| p.is_active())
                .filter(|p| section.as_deref().is_none_or(|s| p.in_section(s)))
                .take(*limit);
            BlockView {
                heading: text(heading),
                products: cards(ctx, picked, settings, wishlist),
                ..base
            }
        }
        PageSection::Image { url, alt, link } => BlockView {
            url: url.clone(),
            alt: text(alt),
            link: link.as_deref().map(local).unwrap_or_default(),
            ..base
        },
    }
}

/// Split text on blank lines.
fn paragraphs(body: &str) -> Vec<String> {
    body.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[instrument(skip(ctx))]
pub async fn product(ctx: Ctx) -> Result<Response, AppError> {
    let id = ProductId::from(ctx.param("id")?);
    let settings = ctx.shop_settings()?;
    let product = ctx.api.get_product(&id).await?;
    if !product.is_active() {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    let viewed = visitor::record_view(&ctx.session, &product).await?;
    let wishlist = visitor::wishlist(&ctx.session).await?;
    let recent_ids: Vec<&ProductId> = viewed.excluding(&product.id).take(RECENT_STRIP).collect();

    let recently_viewed = if recent_ids.is_empty() {
        Vec::new()
    } else {
        match ctx.api.list_products().await {
            Ok(all) => {
                let picked = recent_ids
                    .iter()
                    .filter_map(|id| all.iter().find(|p| &&p.id == id));
                cards(&ctx, picked, settings, &wishlist)
            }
            Err(err) => {
                warn!(error = %err, "Failed to load recently viewed products");
                Vec::new()
            }
        }
    };

    let section = product.section.clone().filter(|s| !s.trim().is_empty());
    let view = ProductDetailView {
        card: ProductCard::new(&ctx, &product, settings, &wishlist),
        description: paragraphs(product.description.as_deref().unwrap_or_default()),
        images: product.images.clone(),
        quantity: product.quantity,
        section_href: section
            .as_deref()
            .map(|s| ctx.href(&format!("/{}", nepostore_core::models::slugify(s)))),
        section,
    };

    Ok(ProductTemplate {
        chrome: ShopChrome::load(&ctx, Some(&product.name)).await?,
        action: ctx.href(&product_path(&product)),
        product: view,
        recently_viewed,
    }
    .into_response())
}

#[instrument(skip(ctx))]
pub async fn category(ctx: Ctx) -> Result<Response, AppError> {
    let id = CategoryId::from(ctx.param("id")?);
    let settings = ctx.shop_settings()?;
    let (category, products, wishlist) = tokio::join!(
        ctx.api.get_category(&id),
        ctx.api.list_products(),
        visitor::wishlist(&ctx.session),
    );
    let (category, products, wishlist) = (category?, products?, wishlist?);

    let members = products
        .iter()
        .filter(|p| p.category.as_ref() == Some(&category.id));

    Ok(CategoryTemplate {
        chrome: ShopChrome::load(&ctx, Some(&category.name)).await?,
        products: cards(&ctx, members, settings, &wishlist),
        name: category.name,
        image: category.image,
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn product_action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    let id = ProductId::from(ctx.param("id")?);
    let back = format!("/product/{}", urlencoding::encode(id.as_str()));

    let outcome = match form.text("action") {
        Some("add_to_cart") => add_to_cart(&ctx, &id, &form).await,
        Some("wishlist") => {
            let tenant = ctx.shop_tenant()?;
            visitor::toggle_wishlist(&ctx.session, ctx.state.settings(), tenant, &id)
                .await
                .map(|added| {
                    if added {
                        "Added to wishlist".to_string()
                    } else {
                        "Removed from wishlist".to_string()
                    }
                })
        }
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(&back, outcome)
}

async fn add_to_cart(ctx: &Ctx, id: &ProductId, form: &UploadedForm) -> Result<String, AppError> {
    let quantity: u32 = form
        .text("quantity")
        .unwrap_or("1")
        .parse()
        .map_err(|_| AppError::BadRequest("Quantity must be a whole number".to_string()))?;
    let product = ctx.api.get_product(id).await?;
    if !product.is_active() {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    if !product.in_stock() {
        return Err(AppError::BadRequest(format!("{} is out of stock", product.name)));
    }

    let mut cart = visitor::cart(&ctx.session).await?;
    cart.add(&product, quantity.max(1));
    visitor::save_cart(&ctx.session, &cart).await?;
    Ok(format!("Added {} to your cart", product.name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, section: Option<&str>) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "name": id,
            "sellingPrice": 10,
            "section": section,
        }))
        .unwrap()
    }

    #[test]
    fn test_group_by_section_keeps_first_seen_order() {
        let products = [
            product("a", Some("Hats")),
            product("b", None),
            product("c", Some("Bags")),
            product("d", Some("Hats")),
            product("e", Some("  ")),
        ];
        let refs: Vec<&Product> = products.iter().collect();
        let groups = group_by_section(&refs);
        let titles: Vec<&str> = groups.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(titles, vec!["Hats", UNSECTIONED, "Bags"]);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1.len(), 2);
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(
            paragraphs("First line\n\n\n  Second  \n\n"),
            vec!["First line".to_string(), "Second".to_string()]
        );
        assert!(paragraphs("").is_empty());
    }
}
