use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use campus_trader::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{Products, Users, products, seller_profiles, users},
    format::slugify,
    models::{AccountType, Role},
    services::auth_service::hash_password,
};

const DEFAULT_PASSWORD: &str = "password";

struct SeedUser<'a> {
    name: &'a str,
    email: &'a str,
    role: Role,
    address: &'a str,
    phone_no: &'a str,
}

struct SeedProduct<'a> {
    name: &'a str,
    description: &'a str,
    image: &'a str,
    price: i64,
    quantity: i32,
    category: &'a str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(
        &orm,
        SeedUser {
            name: "Admin",
            email: "admin@app.com",
            role: Role::Admin,
            address: "123 Main St",
            phone_no: "1234567890",
        },
    )
    .await?;
    let customer_id = ensure_user(
        &orm,
        SeedUser {
            name: "User",
            email: "user@app.com",
            role: Role::Customer,
            address: "123 Main St",
            phone_no: "1234567890",
        },
    )
    .await?;
    let seller_id = ensure_user(
        &orm,
        SeedUser {
            name: "Seller",
            email: "seller@app.com",
            role: Role::Seller,
            address: "56 John St",
            phone_no: "9876543210",
        },
    )
    .await?;
    ensure_user(
        &orm,
        SeedUser {
            name: "John Delulu",
            email: "johndelulu@app.com",
            role: Role::Seller,
            address: "56 John St",
            phone_no: "9876543210",
        },
    )
    .await?;

    seed_products(&orm, seller_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {customer_id}");
    Ok(())
}

/// Insert the user unless the email exists. Seeded sellers are approved.
async fn ensure_user(orm: &DatabaseConnection, seed: SeedUser<'_>) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(users::Column::Email.eq(seed.email))
        .one(orm)
        .await?
    {
        println!("User {} already present", seed.email);
        return Ok(existing.id);
    }

    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(seed.name.to_string()),
        email: Set(seed.email.to_string()),
        password_hash: Set(hash_password(DEFAULT_PASSWORD)?),
        role: Set(seed.role),
        approved: Set(true),
        address: Set(seed.address.to_string()),
        phone_no: Set(seed.phone_no.to_string()),
        has_reset_password: Set(false),
        created_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    if seed.role == Role::Seller {
        seller_profiles::ActiveModel {
            user_id: Set(user.id),
            account_type: Set(AccountType::Student),
            created_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Created {:?} {}", seed.role, seed.email);
    Ok(user.id)
}

async fn seed_products(orm: &DatabaseConnection, seller_id: Uuid) -> anyhow::Result<()> {
    let catalogue = [
        SeedProduct {
            name: "Calculus 101 Textbook",
            description: "Used but in good condition. Perfect for Calculus beginners.",
            image: "https://images.unsplash.com/photo-1543002588-bfa74002ed7e?w=1200",
            price: 30,
            quantity: 1,
            category: "Books",
        },
        SeedProduct {
            name: "Dell Inspiron 15",
            description: "Lightly used, 8GB RAM, 1TB HDD. Suitable for all your coding and design needs.",
            image: "https://images.unsplash.com/photo-1588872657578-7efd1f1555ed?w=1200",
            price: 300,
            quantity: 1,
            category: "Electronics",
        },
        SeedProduct {
            name: "Used Trek Bicycle",
            description: "A reliable companion for your campus commutes. Minor wear and tear.",
            image: "https://images.unsplash.com/photo-1511994298241-608e28f14fde?w=1200",
            price: 120,
            quantity: 1,
            category: "Transport",
        },
        SeedProduct {
            name: "Kindle Paperwhite",
            description: "Enjoy a library at your fingertips. Waterproof, high-res display.",
            image: "https://images.unsplash.com/photo-1611650933823-97a2a1922b7e?w=1200",
            price: 120,
            quantity: 1,
            category: "Electronics",
        },
        SeedProduct {
            name: "Stationary Set",
            description: "Complete set includes pens, pencils, erasers, and notepads.",
            image: "https://images.unsplash.com/photo-1625533617580-3977f2651fc0?w=1200",
            price: 20,
            quantity: 10,
            category: "Supplies",
        },
        SeedProduct {
            name: "French Press Coffee Maker",
            description: "Make the perfect cup of coffee to fuel your study sessions.",
            image: "https://images.unsplash.com/photo-1519082274554-1ca37fb8abb7?w=1200",
            price: 25,
            quantity: 5,
            category: "Kitchen",
        },
    ];

    for product in catalogue {
        let slug = slugify(product.name);
        let exists = Products::find()
            .filter(products::Column::Slug.eq(slug.as_str()))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now();
        products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(product.name.to_string()),
            description: Set(product.description.to_string()),
            price: Set(Decimal::from(product.price)),
            commission: Set(Decimal::ZERO),
            quantity: Set(product.quantity),
            image: Set(product.image.to_string()),
            category: Set(vec![product.category.to_string()]),
            approved: Set(true),
            slug: Set(slug),
            seller_id: Set(seller_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
