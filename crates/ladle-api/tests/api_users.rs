mod common;

use actix_web::{test, App};
use ladle_core::models::{Recipe, Role};
use ladle_core::traits::{RecipeRepo, UserRepo};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{bearer, seed_user, test_state};

#[actix_web::test]
async fn registration_and_login_roundtrip() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(ladle_api::configure_routes),
    )
    .await;
    let admin = seed_user(&state, "root", "pw", vec![Role::Admin]).await;

    // Register a new account (defaults to Reader).
    let req = test::TestRequest::post()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({ "username": "alice", "password": "hunter2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "New user alice created");

    // Same name, different case: still a duplicate.
    let req = test::TestRequest::post()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({ "username": "ALICE", "password": "hunter2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Duplicate username");

    // Both fields are mandatory.
    let req = test::TestRequest::post()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({ "username": "bob" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);

    // Wrong password, then the real one.
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "alice", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Unauthorized");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "alice", "password": "hunter2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    let token = body["accessToken"].as_str().unwrap().to_string();

    // The fresh token opens authenticated routes, and the listing never
    // leaks credential material.
    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/users")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("passwordHash").is_none());
        assert!(user.get("password").is_none());
    }

    // Listing without a credential stays shut.
    let req = test::TestRequest::get().uri("/users").to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 401);
}

#[actix_web::test]
async fn update_rewrites_roles_and_can_deactivate() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(ladle_api::configure_routes),
    )
    .await;
    let admin = seed_user(&state, "root", "pw", vec![Role::Admin]).await;
    seed_user(&state, "alice", "hunter2", vec![Role::Reader]).await;
    seed_user(&state, "bob", "pw", vec![Role::Reader]).await;

    let alice = state.users.find_by_username("alice").await.unwrap().unwrap();

    // Promote and keep active.
    let req = test::TestRequest::patch()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "id": alice.id,
            "username": "alice",
            "roles": ["Reader", "Writer"],
            "active": true,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "alice updated");

    let reloaded = state.users.get_user(alice.id).await.unwrap().unwrap();
    assert_eq!(reloaded.roles, vec![Role::Reader, Role::Writer]);

    // Renaming over another account conflicts.
    let req = test::TestRequest::patch()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "id": alice.id,
            "username": "BOB",
            "roles": ["Reader"],
            "active": true,
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 409);

    // Dropping a required field is a 400; an unknown id is a 404.
    let req = test::TestRequest::patch()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({ "id": alice.id, "username": "alice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "All fields except password are required");

    let req = test::TestRequest::patch()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "id": Uuid::now_v7(),
            "username": "ghost",
            "roles": ["Reader"],
            "active": true,
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);

    // Deactivated accounts cannot log in any more.
    let req = test::TestRequest::patch()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "id": alice.id,
            "username": "alice",
            "roles": ["Reader"],
            "active": false,
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "alice", "password": "hunter2" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 401);
}

#[actix_web::test]
async fn deletion_is_blocked_while_recipes_remain() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(ladle_api::configure_routes),
    )
    .await;
    let admin = seed_user(&state, "root", "pw", vec![Role::Admin]).await;
    seed_user(&state, "alice", "pw", vec![Role::Writer]).await;
    let alice = state.users.find_by_username("alice").await.unwrap().unwrap();

    let recipe = Recipe::new(
        alice.id,
        "Soup".to_string(),
        None,
        "water\nsalt".to_string(),
        "boil\nseason".to_string(),
        10,
        None,
    );
    let recipe = state.recipes.create_recipe(recipe).await.unwrap();

    // Ownership blocks deletion.
    let req = test::TestRequest::delete()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({ "id": alice.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User has assigned recipes");

    // Clear the recipe, then the account goes.
    state.recipes.delete_recipe(recipe.id).await.unwrap();
    let req = test::TestRequest::delete()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({ "id": alice.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        format!("Username alice with ID {} deleted", alice.id)
    );

    // Gone means 404; a body without an id is a 400.
    let req = test::TestRequest::delete()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({ "id": alice.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User not found");

    let req = test::TestRequest::delete()
        .uri("/users")
        .insert_header(bearer(&admin))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User ID Required");
}

#[actix_web::test]
async fn saved_recipes_toggle_and_expand() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(ladle_api::configure_routes),
    )
    .await;
    seed_user(&state, "chef", "pw", vec![Role::Writer]).await;
    let chef = state.users.find_by_username("chef").await.unwrap().unwrap();
    let reader = seed_user(&state, "alice", "pw", vec![Role::Reader]).await;

    let recipe = Recipe::new(
        chef.id,
        "Soup".to_string(),
        None,
        "water\nsalt".to_string(),
        "boil\nseason".to_string(),
        10,
        None,
    );
    let recipe = state.recipes.create_recipe(recipe).await.unwrap();

    // First toggle saves.
    let req = test::TestRequest::patch()
        .uri("/users/save-recipe")
        .insert_header(bearer(&reader))
        .set_json(json!({ "recipeId": recipe.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([recipe.id.to_string()]));

    // The saved listing expands like the public one.
    let req = test::TestRequest::get()
        .uri("/users/saved-recipes")
        .insert_header(bearer(&reader))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let saved = body.as_array().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["title"], "Soup");
    assert_eq!(saved[0]["ingredients"], json!(["water", "salt"]));
    assert_eq!(saved[0]["user"]["username"], "chef");

    // Second toggle removes.
    let req = test::TestRequest::patch()
        .uri("/users/save-recipe")
        .insert_header(bearer(&reader))
        .set_json(json!({ "recipeId": recipe.id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));

    // A missing id is a 400.
    let req = test::TestRequest::patch()
        .uri("/users/save-recipe")
        .insert_header(bearer(&reader))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Recipe ID required");
}
