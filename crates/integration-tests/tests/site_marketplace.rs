//! Integration tests for the listing, cart, and checkout flow.
//!
//! These tests require a running site (`cargo run -p tradepost-site`) against
//! a database seeded with categories (`tp-cli seed --categories-only`).
//! Run with `cargo test -- --ignored`.

use reqwest::{Client, StatusCode, multipart};
use uuid::Uuid;

use tradepost_integration_tests::{base_url, client, register, unique_email};

/// Create a listing via the multipart form and return its detail URL path.
async fn create_listing(client: &Client, title: &str, price: &str) -> String {
    let base_url = base_url();
    let form = multipart::Form::new()
        .text("title", title.to_string())
        .text("description", "Integration test listing")
        .text("price", price.to_string())
        .text("category_id", "1");

    let resp = client
        .post(format!("{base_url}/listings"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create listing");

    assert_eq!(resp.status(), StatusCode::OK);
    let path = resp.url().path().to_string();
    assert!(path.starts_with("/listings/"), "unexpected path: {path}");
    path
}

#[tokio::test]
#[ignore = "Requires running site with seeded categories"]
async fn test_listing_to_checkout_flow() {
    let base_url = base_url();
    let title = format!("Test Widget {}", Uuid::new_v4());

    // Seller lists an item
    let seller = client();
    register(&seller, "seller", &unique_email("seller"), "hunter2hunter2").await;
    let listing_path = create_listing(&seller, &title, "10.00").await;
    let listing_id = listing_path
        .rsplit('/')
        .next()
        .expect("listing path has an id");

    // Buyer finds it and adds three to the cart
    let buyer = client();
    register(&buyer, "buyer", &unique_email("buyer"), "hunter2hunter2").await;

    let resp = buyer
        .post(format!("{base_url}/cart/add"))
        .form(&[("listing_id", listing_id), ("quantity", "3")])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read cart");
    assert!(body.contains(&title));
    assert!(body.contains("$30.00"));

    // Checkout lands on the purchase details page
    let resp = buyer
        .post(format!("{base_url}/cart/checkout"))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status(), StatusCode::OK);
    let details_path = resp.url().path().to_string();
    assert!(details_path.starts_with("/purchases/"));
    let body = resp.text().await.expect("Failed to read details");
    assert!(body.contains("Purchase completed"));
    assert!(body.contains(&title));
    assert!(body.contains("$30.00"));

    // The cart is now empty
    let resp = buyer
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to load cart");
    let body = resp.text().await.expect("Failed to read cart");
    assert!(!body.contains(&title));

    // Purchase shows up in the buyer's history
    let resp = buyer
        .get(format!("{base_url}/purchases"))
        .send()
        .await
        .expect("Failed to load purchases");
    let body = resp.text().await.expect("Failed to read purchases");
    assert!(body.contains(&details_path));

    // And in the seller's sales, with the buyer's name
    let resp = seller
        .get(format!("{base_url}/sales"))
        .send()
        .await
        .expect("Failed to load sales");
    let body = resp.text().await.expect("Failed to read sales");
    assert!(body.contains(&title));
    assert!(body.contains("buyer"));

    // The buyer cannot open someone else's purchase
    let resp = seller
        .get(format!("{base_url}{details_path}"))
        .send()
        .await
        .expect("Failed to request details");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running site with seeded categories"]
async fn test_cannot_add_own_listing() {
    let base_url = base_url();
    let title = format!("Own Goods {}", Uuid::new_v4());

    let seller = client();
    register(&seller, "selfbuy", &unique_email("selfbuy"), "hunter2hunter2").await;
    let listing_path = create_listing(&seller, &title, "5.00").await;
    let listing_id = listing_path
        .rsplit('/')
        .next()
        .expect("listing path has an id");

    let resp = seller
        .post(format!("{base_url}/cart/add"))
        .form(&[("listing_id", listing_id), ("quantity", "1")])
        .send()
        .await
        .expect("Failed to post add");

    let body = resp.text().await.expect("Failed to read cart");
    assert!(body.contains("flash-error"));
    assert!(!body.contains(&title));
}

#[tokio::test]
#[ignore = "Requires running site with seeded categories"]
async fn test_update_rejected_for_non_owner() {
    let base_url = base_url();
    let title = format!("Untouchable {}", Uuid::new_v4());

    let seller = client();
    register(&seller, "owner", &unique_email("owner"), "hunter2hunter2").await;
    let listing_path = create_listing(&seller, &title, "9.99").await;

    // A different logged-in user tries to overwrite it, image included
    let intruder = client();
    register(
        &intruder,
        "intruder",
        &unique_email("intruder"),
        "hunter2hunter2",
    )
    .await;

    let form = multipart::Form::new()
        .text("title", "Hijacked")
        .text("description", "nope")
        .text("price", "0.01")
        .text("category_id", "1")
        .part(
            "image",
            multipart::Part::bytes(b"fake-image".to_vec()).file_name("evil.png"),
        );

    let resp = intruder
        .post(format!("{base_url}{listing_path}"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post update");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The listing is unchanged
    let resp = seller
        .get(format!("{base_url}{listing_path}"))
        .send()
        .await
        .expect("Failed to load listing");
    let body = resp.text().await.expect("Failed to read listing");
    assert!(body.contains(&title));
    assert!(!body.contains("Hijacked"));
    assert!(body.contains("$9.99"));
}

#[tokio::test]
#[ignore = "Requires running site with seeded categories"]
async fn test_checkout_empty_cart() {
    let base_url = base_url();

    let buyer = client();
    register(&buyer, "empty", &unique_email("empty"), "hunter2hunter2").await;

    let resp = buyer
        .post(format!("{base_url}/cart/checkout"))
        .send()
        .await
        .expect("Failed to post checkout");

    // Back on the cart page with a flash, no purchase created
    assert!(resp.url().path().starts_with("/cart"));
    let body = resp.text().await.expect("Failed to read cart");
    assert!(body.contains("Your cart is empty"));

    let resp = buyer
        .get(format!("{base_url}/purchases"))
        .send()
        .await
        .expect("Failed to load purchases");
    let body = resp.text().await.expect("Failed to read purchases");
    assert!(body.contains("not bought anything"));
}

#[tokio::test]
#[ignore = "Requires running site with seeded categories"]
async fn test_checkout_stale_cart_entry() {
    let base_url = base_url();
    let title = format!("Vanishing {}", Uuid::new_v4());

    let seller = client();
    register(&seller, "ghost", &unique_email("ghost"), "hunter2hunter2").await;
    let listing_path = create_listing(&seller, &title, "7.50").await;
    let listing_id = listing_path
        .rsplit('/')
        .next()
        .expect("listing path has an id")
        .to_string();

    let buyer = client();
    register(&buyer, "chaser", &unique_email("chaser"), "hunter2hunter2").await;
    let resp = buyer
        .post(format!("{base_url}/cart/add"))
        .form(&[("listing_id", listing_id.as_str()), ("quantity", "1")])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    // Seller deletes the listing out from under the cart
    let resp = seller
        .post(format!("{base_url}{listing_path}/delete"))
        .send()
        .await
        .expect("Failed to delete listing");
    assert!(resp.status().is_success() || resp.status().is_redirection());

    let resp = buyer
        .post(format!("{base_url}/cart/checkout"))
        .send()
        .await
        .expect("Failed to post checkout");

    assert!(resp.url().path().starts_with("/cart"));
    let body = resp.text().await.expect("Failed to read cart");
    assert!(body.contains("Checkout failed"));
}
