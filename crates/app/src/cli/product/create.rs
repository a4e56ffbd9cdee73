use clap::Args;
use fulfilment_app::{
    database::{self, Db},
    domain::products::{PgProductsService, ProductsService, data::NewProduct, records::ProductUuid},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    /// Product display name
    #[arg(long)]
    name: String,

    /// Stock keeping unit, unique across the catalog
    #[arg(long)]
    sku: String,

    /// Price in minor units (e.g. cents)
    #[arg(long)]
    price: u64,

    /// ISO-4217 currency code
    #[arg(long, default_value = "USD")]
    currency: String,

    /// Units in stock
    #[arg(long, default_value_t = 0)]
    stock: u32,

    /// Image URL; repeat for several, the first is the primary image
    #[arg(long = "image")]
    images: Vec<String>,

    /// Category UUID; repeat for several
    #[arg(long = "category")]
    categories: Vec<Uuid>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Optional product UUID; generated when omitted
    #[arg(long)]
    product_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateProductArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgProductsService::new(Db::new(pool));

    let product = service
        .create_product(NewProduct {
            uuid: args
                .product_uuid
                .map_or_else(ProductUuid::new, ProductUuid::from_uuid),
            name: args.name,
            sku: args.sku,
            price: args.price,
            currency: args.currency.to_ascii_uppercase(),
            stock_quantity: args.stock,
            images: args.images,
            categories: args.categories,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("sku: {}", product.sku);
    println!("price: {} {}", product.price, product.currency);
    println!("stock_quantity: {}", product.stock_quantity);

    Ok(())
}
