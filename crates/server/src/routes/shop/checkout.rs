//! Cart review and order placement.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::models::{NewOrder, OrderCustomer, StoreSettings};
use nepostore_core::types::{AmountOverflow, DeliveryZone, ProductId};
use nepostore_core::visitor::Cart;
use serde::Deserialize;
use tracing::{info, instrument};

use super::ShopChrome;
use crate::error::AppError;
use crate::routes::Ctx;
use crate::uploads::UploadedForm;
use crate::visitor;

const PATH: &str = "/checkout";

#[derive(Debug, Default, Deserialize)]
struct CheckoutQuery {
    #[serde(default)]
    zone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub href: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Clone)]
pub struct ZoneOption {
    pub value: &'static str,
    pub label: &'static str,
    pub rate: String,
    pub selected: bool,
}

/// Amounts for a cart delivered to one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: String,
    pub delivery: String,
    pub total: String,
}

impl Totals {
    fn new(
        cart: &Cart,
        settings: &StoreSettings,
        zone: DeliveryZone,
    ) -> Result<Self, AmountOverflow> {
        let subtotal = cart.subtotal()?;
        let delivery = settings.delivery_charge(zone);
        let total = subtotal.checked_add(delivery).ok_or(AmountOverflow)?;
        Ok(Self {
            subtotal: settings.format(subtotal),
            delivery: settings.format(delivery),
            total: settings.format(total),
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/checkout.html")]
pub struct CheckoutTemplate {
    pub chrome: ShopChrome,
    pub action: String,
    pub lines: Vec<CartLineView>,
    pub zones: Vec<ZoneOption>,
    pub totals: Totals,
    pub is_empty: bool,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let settings = ctx.shop_settings()?;
    let query: CheckoutQuery = ctx.query();
    let zone = query
        .zone
        .as_deref()
        .and_then(|z| z.parse::<DeliveryZone>().ok())
        .unwrap_or_default();
    let cart = visitor::cart(&ctx.session).await?;
    let totals = Totals::new(&cart, settings, zone).map_err(too_large)?;

    let lines = cart
        .lines
        .iter()
        .map(|line| {
            Ok(CartLineView {
                product_id: line.product_id.to_string(),
                name: line.name.clone(),
                image: line.image.clone(),
                href: ctx.href(&format!(
                    "/product/{}",
                    urlencoding::encode(line.product_id.as_str())
                )),
                quantity: line.quantity,
                unit_price: settings.format(line.unit_price),
                line_total: settings.format(line.line_total().map_err(too_large)?),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    let zones = DeliveryZone::ALL
        .iter()
        .map(|z| ZoneOption {
            value: z.as_str(),
            label: z.label(),
            rate: settings.format(settings.delivery_charge(*z)),
            selected: *z == zone,
        })
        .collect();

    Ok(CheckoutTemplate {
        chrome: ShopChrome::load(&ctx, Some("Checkout")).await?,
        action: ctx.href(PATH),
        lines,
        zones,
        totals,
        is_empty: cart.is_empty(),
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    match form.text("action") {
        Some("place") => match place(&ctx, &form).await {
            Ok(message) => Ok(ctx.success("/", &message)),
            Err(err) => ctx.finish(PATH, Err(err)),
        },
        Some("update") => {
            let outcome = update(&ctx, &form).await;
            ctx.finish(PATH, outcome)
        }
        Some("remove") => {
            let outcome = remove(&ctx, &form).await;
            ctx.finish(PATH, outcome)
        }
        _ => ctx.finish(PATH, Err(AppError::BadRequest("Unknown action".to_string()))),
    }
}

fn product_id(form: &UploadedForm) -> Result<ProductId, AppError> {
    form.text("product_id")
        .map(ProductId::from)
        .ok_or_else(|| AppError::BadRequest("Missing product".to_string()))
}

async fn update(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = product_id(form)?;
    let quantity: u32 = form
        .text("quantity")
        .unwrap_or("0")
        .parse()
        .map_err(|_| AppError::BadRequest("Quantity must be a whole number".to_string()))?;
    let product = ctx.api.get_product(&id).await?;
    let mut cart = visitor::cart(&ctx.session).await?;
    cart.set_quantity(&product, quantity);
    visitor::save_cart(&ctx.session, &cart).await?;
    Ok("Cart updated".to_string())
}

/// A cart whose amounts overflow cannot be shown or ordered.
fn too_large(_: AmountOverflow) -> AppError {
    AppError::BadRequest("Your cart total is too large, please remove some items".to_string())
}

async fn remove(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = product_id(form)?;
    let mut cart = visitor::cart(&ctx.session).await?;
    cart.remove(&id);
    visitor::save_cart(&ctx.session, &cart).await?;
    Ok("Removed from cart".to_string())
}

/// Build the order from the cart and form, place it, and empty the cart.
async fn place(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let settings = ctx.shop_settings()?;
    let zone: DeliveryZone = form
        .text("zone")
        .map(str::parse)
        .transpose()
        .map_err(AppError::BadRequest)?
        .unwrap_or_default();
    let mut cart = visitor::cart(&ctx.session).await?;

    let order = NewOrder::build(
        customer_from_form(form),
        cart.order_items(),
        zone,
        settings.delivery_charge(zone),
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let placed = ctx.api.place_order(&order).await?;
    info!(order_id = %placed.id, total = %placed.total, "Order placed");

    cart.clear();
    visitor::save_cart(&ctx.session, &cart).await?;
    Ok(format!("Thank you! Order {} has been placed", placed.id))
}

fn customer_from_form(form: &UploadedForm) -> OrderCustomer {
    let text = |name: &str| form.text(name).unwrap_or_default().to_string();
    OrderCustomer {
        name: text("name"),
        email: form.text("email").map(String::from),
        phone: text("phone"),
        address: text("address"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nepostore_core::models::Product;
    use rust_decimal::Decimal;

    #[test]
    fn test_totals_include_zone_rate() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1", "name": "Tea", "sellingPrice": 250, "quantity": 10
        }))
        .unwrap();
        let mut cart = Cart::default();
        cart.add(&product, 2);
        let settings = StoreSettings {
            inside_valley_rate: Decimal::new(100, 0),
            outside_valley_rate: Decimal::new(200, 0),
            ..StoreSettings::default()
        };

        let inside = Totals::new(&cart, &settings, DeliveryZone::InsideValley).unwrap();
        assert_eq!(inside.subtotal, settings.format(Decimal::new(500, 0)));
        assert_eq!(inside.total, settings.format(Decimal::new(600, 0)));

        let outside = Totals::new(&cart, &settings, DeliveryZone::OutsideValley).unwrap();
        assert_eq!(outside.total, settings.format(Decimal::new(700, 0)));
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1", "name": "Gold", "sellingPrice": "79228162514264337593543950335", "quantity": 10
        }))
        .unwrap();
        let mut cart = Cart::default();
        cart.add(&product, 1);
        let settings = StoreSettings {
            inside_valley_rate: Decimal::new(100, 0),
            ..StoreSettings::default()
        };
        assert_eq!(
            Totals::new(&cart, &settings, DeliveryZone::InsideValley),
            Err(AmountOverflow)
        );
    }

    #[test]
    fn test_customer_from_form() {
        let form = UploadedForm::from_urlencoded(
            b"name=Sita+Sharma&phone=9800000000&address=Patan&email=",
        );
        let customer = customer_from_form(&form);
        assert_eq!(customer.name, "Sita Sharma");
        assert!(customer.email.is_none());
        assert!(customer.validate().is_ok());
    }
}
