//! Terminal output.

#![allow(clippy::print_stdout)]

use quickshop_core::{
    Category, DashboardData, MediaItem, Order, OrderList, Product, StoreInfo, UserRecord,
};

pub fn line(text: &str) {
    println!("{text}");
}

pub fn user(user: &UserRecord) {
    println!("{} <{}>", user.display_name(), user.email);
    if let Some(slug) = &user.store_slug {
        println!("  store: {slug}");
    }
}

pub fn dashboard(data: &DashboardData) {
    let stats = &data.stats;
    println!("Today:     {} orders, {} sales", stats.today_orders, money(stats.today_sales));
    println!("Month:     {} orders, {} sales", stats.monthly_orders, money(stats.monthly_sales));
    println!("Products:  {}", stats.total_products);
    println!("Last week: {}", data.weekly_total());

    if !data.recent_orders.is_empty() {
        println!();
        println!("Recent orders:");
        for order in &data.recent_orders {
            order_row(order);
        }
    }

    if !data.popular_products.is_empty() {
        println!();
        println!("Popular products:");
        for product in &data.popular_products {
            println!(
                "  {:>6}  {}  ({} orders, {} sold)",
                product.id, product.name, product.orders_count, product.total_quantity
            );
        }
    }
}

pub fn orders(list: &OrderList) {
    for order in &list.orders {
        order_row(order);
    }
    println!("{} of {} orders", list.orders.len(), list.total);
}

fn order_row(order: &Order) {
    println!(
        "  #{:<6} {:<12} {:<24} {:>10}  {}",
        order.id,
        order.status.code(),
        order.customer_name(),
        order.total,
        order.created_date,
    );
}

pub fn order(order: &Order) {
    println!("Order #{}", order.order_number.as_deref().unwrap_or(&order.id.to_string()));
    println!("  status:   {} ({})", order.status.label(), order.status.code());
    println!("  payment:  {}", order.payment_status().label());
    println!("  customer: {} {} {}", order.customer_name(), order.email, order.phone);
    if let Some(city) = &order.city {
        println!("  address:  {} {city}", order.street.as_deref().unwrap_or_default());
    }
    for item in &order.order_items {
        println!("  - {} x{}", item.display_name(), item.quantity);
    }
    println!("  total:    {}", order.total);
    if let Some(notes) = &order.order_notes {
        println!("  notes:    {notes}");
    }
}

pub fn products(products: &[Product], total: u64) {
    for product in products {
        let sale = if product.is_on_sale() { " (sale)" } else { "" };
        println!(
            "  {:>6}  {:<32} {:>10}{sale}  stock {}",
            product.id,
            product.name,
            product.effective_price(),
            product.total_inventory()
        );
    }
    println!("{} of {total} products", products.len());
}

pub fn product(product: &Product) {
    println!("{} ({})", product.name, product.id);
    println!("  price:      {}", product.effective_price());
    if let Some(percent) = product.discount_percent() {
        println!("  discount:   {percent}%");
    }
    println!("  stock:      {}", product.total_inventory());
    println!("  visible:    {}", product.is_visible());
    if !product.category_labels().is_empty() {
        println!("  categories: {}", product.category_labels().join(", "));
    }
    for variant in &product.variants {
        println!("  - {} {} stock {}", variant.sku, variant.regular_price, variant.inventory_quantity);
    }
}

pub fn categories(categories: &[Category]) {
    for category in categories {
        println!("  {:>6}  {}", category.id, category.name);
    }
}

pub fn media(items: &[MediaItem]) {
    for item in items {
        println!(
            "  {}  {}",
            item.filename.as_deref().unwrap_or("-"),
            item.url.as_deref().unwrap_or("-")
        );
    }
}

pub fn store(info: &StoreInfo, stores_base: &str) {
    println!("{} ({})", info.name, info.slug);
    println!("  url:      {}", info.storefront_url(stores_base));
    if let Some(email) = &info.email {
        println!("  email:    {email}");
    }
    if let Some(phone) = &info.phone {
        println!("  phone:    {phone}");
    }
    if let Some(status) = &info.status {
        println!("  status:   {status}");
    }
}

pub fn entries(entries: &[(String, String)]) {
    if entries.is_empty() {
        println!("(empty)");
    }
    for (key, value) in entries {
        println!("{key}: {value}");
    }
}

fn money(amount: Option<impl std::fmt::Display>) -> String {
    amount.map_or_else(|| "-".to_owned(), |a| a.to_string())
}
