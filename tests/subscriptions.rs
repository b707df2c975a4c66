mod common;

use common::{ingredient, recipe, setup, user};
use foodgram_sdk::{
    actions::{edges::add_edge, subscriptions::list_subscriptions},
    schema::{EdgeKind, MeasurementUnit},
};

#[tokio::test]
async fn entries_carry_count_and_capped_preview() {
    let pool = setup().await;
    let alice = user("alice", &pool).await;
    let bob = user("bob", &pool).await;
    let salt = ingredient("salt", MeasurementUnit::Gram, &pool).await;

    let mut recipes = vec![];
    for i in 0..5 {
        recipes.push(recipe(bob, &format!("Dish {i}"), &[(salt, 1)], &pool).await);
    }

    add_edge(EdgeKind::Subscription, alice, bob, &pool).await.unwrap();

    let page = list_subscriptions(alice, None, 0, &pool).await.unwrap();
    assert_eq!(page.total_rows, 1);

    let entry = &page.rows[0];
    assert_eq!(entry.author.id, bob);
    assert!(entry.author.is_subscribed);
    assert_eq!(entry.recipes_count, 5);

    let preview: Vec<_> = entry.recipes.iter().map(|r| r.id).collect();
    assert_eq!(preview, vec![recipes[4], recipes[3], recipes[2]]);

    let page = list_subscriptions(alice, Some(1), 0, &pool).await.unwrap();
    assert_eq!(page.rows[0].recipes.len(), 1);
    assert_eq!(page.rows[0].recipes_count, 5);
}

#[tokio::test]
async fn most_recent_subscription_comes_first() {
    let pool = setup().await;
    let alice = user("alice", &pool).await;
    let bob = user("bob", &pool).await;
    let carol = user("carol", &pool).await;

    add_edge(EdgeKind::Subscription, alice, bob, &pool).await.unwrap();
    add_edge(EdgeKind::Subscription, alice, carol, &pool).await.unwrap();

    let page = list_subscriptions(alice, None, 0, &pool).await.unwrap();
    let authors: Vec<_> = page.rows.iter().map(|s| s.author.id).collect();
    assert_eq!(authors, vec![carol, bob]);
    assert!(page.rows.iter().all(|s| s.recipes.is_empty()));

    let page = list_subscriptions(bob, None, 0, &pool).await.unwrap();
    assert!(page.rows.is_empty());
}
