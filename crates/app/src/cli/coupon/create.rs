use clap::{Args, ValueEnum};
use fulfilment::coupons::{CouponCode, CouponDiscount};
use fulfilment_app::{
    database::{self, Db},
    domain::coupons::{CouponsService, PgCouponsService, data::NewCoupon, records::CouponUuid},
};
use jiff::Timestamp;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DiscountKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    /// Redemption code; stored upper-cased
    #[arg(long)]
    code: String,

    /// Discount type
    #[arg(long, value_enum)]
    kind: DiscountKind,

    /// Percentage (1-100) or fixed amount in minor units
    #[arg(long)]
    value: u64,

    /// Minimum cart subtotal in minor units
    #[arg(long, default_value_t = 0)]
    min_purchase: u64,

    /// Maximum discount in minor units
    #[arg(long)]
    max_discount: Option<u64>,

    /// Start of the validity window (RFC 3339); defaults to now
    #[arg(long)]
    valid_from: Option<Timestamp>,

    /// End of the validity window (RFC 3339)
    #[arg(long)]
    valid_until: Timestamp,

    /// Maximum number of redemptions
    #[arg(long)]
    usage_limit: Option<u64>,

    /// Restrict to a product UUID; repeat for several
    #[arg(long = "product")]
    applicable_products: Vec<Uuid>,

    /// Restrict to a category UUID; repeat for several
    #[arg(long = "category")]
    applicable_categories: Vec<Uuid>,

    /// Create the coupon disabled
    #[arg(long)]
    inactive: bool,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let code = CouponCode::parse(&args.code).map_err(|error| format!("invalid code: {error}"))?;

    let discount = match args.kind {
        DiscountKind::Percentage => CouponDiscount::Percentage {
            percentage: u16::try_from(args.value)
                .map_err(|_overflow| "percentage must be between 1 and 100".to_string())?,
        },
        DiscountKind::Fixed => CouponDiscount::Fixed { amount: args.value },
    };

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCouponsService::new(Db::new(pool));

    let coupon = service
        .create_coupon(NewCoupon {
            uuid: CouponUuid::new(),
            code,
            discount,
            min_purchase: args.min_purchase,
            max_discount: args.max_discount,
            valid_from: args.valid_from.unwrap_or_else(Timestamp::now),
            valid_until: args.valid_until,
            usage_limit: args.usage_limit,
            is_active: !args.inactive,
            applicable_products: args.applicable_products,
            applicable_categories: args.applicable_categories,
        })
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("code: {}", coupon.code);
    println!("valid: {} .. {}", coupon.valid_from, coupon.valid_until);

    Ok(())
}
