use mongodb::bson::{Document, doc};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use std::env;

use crate::storage::mongo::{
    COLL_AD_SESSIONS, COLL_API_TOKENS, COLL_EPISODE_SERIES, COLL_EPISODE_ZIPS, COLL_MOVIE_LINKS,
    COLL_QUALITY_LINKS,
};

pub async fn get_database() -> mongodb::error::Result<Database> {
    let uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| String::from("mongodb://localhost:27017"));
    let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| String::from("moviezone"));

    let client = Client::with_uri_str(&uri).await?;
    Ok(client.database(&db_name))
}

fn unique_index(keys: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

/// Creates the unique indexes the engine depends on. The per-collection
/// `short_code` indexes are the final backstop for the allocator's
/// check-then-insert race, and the composite session index is what lets
/// `record_ad_view` upsert instead of racing an insert.
pub async fn ensure_indexes(db: &Database) -> mongodb::error::Result<()> {
    for coll in [
        COLL_MOVIE_LINKS,
        COLL_QUALITY_LINKS,
        COLL_EPISODE_SERIES,
        COLL_EPISODE_ZIPS,
    ] {
        db.collection::<Document>(coll)
            .create_index(unique_index(doc! { "short_code": 1 }))
            .await?;
    }

    db.collection::<Document>(COLL_AD_SESSIONS)
        .create_index(unique_index(doc! {
            "visitor_hash": 1,
            "short_code": 1,
            "link_type": 1,
        }))
        .await?;

    db.collection::<Document>(COLL_API_TOKENS)
        .create_index(unique_index(doc! { "token_value": 1 }))
        .await?;

    Ok(())
}
