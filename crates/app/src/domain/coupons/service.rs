//! Coupons service.

use async_trait::async_trait;
use fulfilment::{
    coupons::{CouponCode, CouponDiscount},
    money,
    pricing::PricingError,
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::{Db, fits_bigint},
    domain::{
        carts::{PgCartItemsRepository, PgCartsRepository, coupon_lines, load_cart_lines},
        coupons::{
            data::NewCoupon,
            errors::CouponsServiceError,
            records::{CouponRecord, ValidatedCoupon},
            repository::PgCouponsRepository,
            validation::validate_coupon,
        },
        products::PgProductsRepository,
    },
    identity::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
    products: PgProductsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
            products: PgProductsRepository::new(),
        }
    }
}

fn check_new_coupon(coupon: &NewCoupon) -> Result<(), CouponsServiceError> {
    if coupon.valid_until <= coupon.valid_from {
        return Err(CouponsServiceError::InvalidData);
    }

    let amounts = [
        Some(coupon.discount.value()),
        Some(coupon.min_purchase),
        coupon.max_discount,
        coupon.usage_limit,
    ];

    if !amounts.into_iter().flatten().all(fits_bigint) {
        return Err(CouponsServiceError::InvalidData);
    }

    match coupon.discount {
        CouponDiscount::Percentage { percentage }
            if percentage == 0 || percentage > 100 =>
        {
            Err(CouponsServiceError::InvalidData)
        }
        CouponDiscount::Fixed { amount: 0 } => {
            Err(CouponsServiceError::InvalidData)
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(coupon_uuid = %coupon.uuid, coupon_code = %coupon.code),
        err
    )]
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        check_new_coupon(&coupon)?;

        let mut tx = self.db.begin_transaction().await?;

        let created = self.repository.create_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        info!(coupon_uuid = %created.uuid, "created coupon");

        Ok(created)
    }

    async fn get_coupon(&self, code: CouponCode) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let coupon = self
            .repository
            .find_coupon(&mut tx, &code)
            .await?
            .ok_or(CouponsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(coupon)
    }

    #[tracing::instrument(
        name = "coupons.service.validate_coupon",
        skip(self),
        fields(user_uuid = %user, coupon_code = %code),
        err
    )]
    async fn validate_coupon(
        &self,
        user: UserUuid,
        code: CouponCode,
    ) -> Result<ValidatedCoupon, CouponsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self
            .carts
            .find_cart(&mut tx, user)
            .await?
            .ok_or(CouponsServiceError::EmptyCart)?;

        let items = self.items.get_cart_items(&mut tx, cart.uuid).await?;

        if items.is_empty() {
            return Err(CouponsServiceError::EmptyCart);
        }

        let lines =
            load_cart_lines::<CouponsServiceError>(&mut tx, &self.products, items).await?;
        let views = coupon_lines(&lines).map_err(PricingError::from)?;

        let found = self.repository.find_coupon(&mut tx, &code).await?;

        tx.commit().await?;

        let coupon = validate_coupon(found, &views, Timestamp::now()).inspect_err(|rejection| {
            warn!(reason = rejection.as_str(), "coupon rejected");
        })?;

        let Some(first) = views.first() else {
            return Err(CouponsServiceError::EmptyCart);
        };

        let currency = first.line_total.currency();
        let subtotal = money::sum(currency, views.iter().map(|line| line.line_total))
            .map_err(PricingError::from)?;
        let discount = coupon
            .rules()
            .discount_on(&subtotal)
            .map_err(PricingError::from)?;

        Ok(ValidatedCoupon {
            discount: money::to_minor(&discount).map_err(PricingError::from)?,
            currency: currency.iso_alpha_code.to_string(),
            coupon,
        })
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Create a coupon.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    /// Look up a coupon by code.
    async fn get_coupon(&self, code: CouponCode) -> Result<CouponRecord, CouponsServiceError>;

    /// Check a coupon against the user's cart and report the discount it would give.
    ///
    /// Nothing is written.
    async fn validate_coupon(
        &self,
        user: UserUuid,
        code: CouponCode,
    ) -> Result<ValidatedCoupon, CouponsServiceError>;
}
