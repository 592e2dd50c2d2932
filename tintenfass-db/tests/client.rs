//! Store-level tests against a per-test database.

use sqlx::PgPool;
use tintenfass_common::model::{
    author::{CreateAuthor, UpdateAuthor, UserName},
    post::{CreatePost, UpdatePost},
};
use tintenfass_db::client::DbClient;

fn ada() -> CreateAuthor {
    CreateAuthor {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        user_name: UserName::new("ada".to_owned()).unwrap(),
    }
}

fn grace() -> CreateAuthor {
    CreateAuthor {
        first_name: "Grace".to_owned(),
        last_name: "Hopper".to_owned(),
        user_name: UserName::new("grace".to_owned()).unwrap(),
    }
}

#[sqlx::test]
async fn duplicate_user_name_insert_fails_and_inserts_nothing(pool: PgPool) {
    let db = DbClient::new(pool);
    db.create_author(&ada()).await.unwrap();

    let duplicate = CreateAuthor {
        first_name: "Augusta".to_owned(),
        ..ada()
    };
    assert!(db.create_author(&duplicate).await.is_err());

    assert_eq!(db.list_authors().await.unwrap().len(), 1);
}

#[sqlx::test]
async fn user_name_uniqueness_check_excludes_the_updated_author(pool: PgPool) {
    let db = DbClient::new(pool);
    let ada = db.create_author(&ada()).await.unwrap();

    assert!(
        db.fetch_author_by_user_name(&ada.user_name)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        !db.user_name_taken_by_other(&ada.user_name, ada.id)
            .await
            .unwrap()
    );

    let grace = db.create_author(&grace()).await.unwrap();
    assert!(
        db.user_name_taken_by_other(&ada.user_name, grace.id)
            .await
            .unwrap()
    );
}

#[sqlx::test]
async fn deleting_an_author_removes_their_posts(pool: PgPool) {
    let db = DbClient::new(pool);
    let ada = db.create_author(&ada()).await.unwrap();
    let grace = db.create_author(&grace()).await.unwrap();

    for title in ["first", "second"] {
        db.create_post(&CreatePost {
            title: title.to_owned(),
            content: "by ada".to_owned(),
            author: ada.id,
        })
        .await
        .unwrap();
    }
    db.create_post(&CreatePost {
        title: "third".to_owned(),
        content: "by grace".to_owned(),
        author: grace.id,
    })
    .await
    .unwrap();

    db.delete_author(ada.id).await.unwrap();

    assert!(db.fetch_author(ada.id).await.unwrap().is_none());

    let posts = db.list_posts().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author, "Grace Hopper");
}

#[sqlx::test]
async fn partial_post_update_retains_unspecified_fields(pool: PgPool) {
    let db = DbClient::new(pool);
    let ada = db.create_author(&ada()).await.unwrap();
    let post = db
        .create_post(&CreatePost {
            title: "T".to_owned(),
            content: "C".to_owned(),
            author: ada.id,
        })
        .await
        .unwrap();

    let updated = db
        .update_post(
            post.id,
            &UpdatePost {
                title: Some("T2".to_owned()),
                ..UpdatePost::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "T2");
    assert_eq!(updated.content.as_deref(), Some("C"));
    assert_eq!(updated.author, ada.id);
    assert_eq!(updated.created, post.created);
}

#[sqlx::test]
async fn partial_author_update_retains_unspecified_fields(pool: PgPool) {
    let db = DbClient::new(pool);
    let ada = db.create_author(&ada()).await.unwrap();

    let updated = db
        .update_author(
            ada.id,
            &UpdateAuthor {
                last_name: Some("Byron".to_owned()),
                ..UpdateAuthor::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.first_name, "Ada");
    assert_eq!(updated.last_name, "Byron");
    assert_eq!(updated.user_name, ada.user_name);
}

#[sqlx::test]
async fn fetch_post_resolves_the_author_full_name(pool: PgPool) {
    let db = DbClient::new(pool);
    let ada = db.create_author(&ada()).await.unwrap();
    let post = db
        .create_post(&CreatePost {
            title: "T".to_owned(),
            content: "C".to_owned(),
            author: ada.id,
        })
        .await
        .unwrap();

    let fetched = db.fetch_post(post.id).await.unwrap().unwrap();
    assert_eq!(fetched.author, "Ada Lovelace");
    assert!(fetched.comments.is_empty());

    db.delete_post(post.id).await.unwrap();
    assert!(db.fetch_post(post.id).await.unwrap().is_none());
}
