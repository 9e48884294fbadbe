use super::helpers::adaptor::SetQueryAdaptor;
use super::helpers::fixtures::{key_strings, kv_strings, recs};
use anyhow::Result;

pub async fn test_union(adaptor: &(impl SetQueryAdaptor + Sync)) -> Result<()> {
    interleaves_in_key_order(adaptor).await?;
    ties_follow_source_order(adaptor).await?;
    empty_sources(adaptor).await?;

    Ok(())
}

async fn interleaves_in_key_order(adaptor: &(impl SetQueryAdaptor + Sync)) -> Result<()> {
    let sources = vec![
        recs(&[("a", "1"), ("d", "4"), ("g", "7")]),
        recs(&[("b", "2"), ("e", "5")]),
        recs(&[("c", "3"), ("f", "6"), ("h", "8")]),
    ];

    let merged = adaptor.union(sources).await?;
    assert_eq!(
        key_strings(&merged),
        vec!["a", "b", "c", "d", "e", "f", "g", "h"]
    );

    Ok(())
}

async fn ties_follow_source_order(adaptor: &(impl SetQueryAdaptor + Sync)) -> Result<()> {
    // Each source carries the shared key with its own value; the merged
    // output keeps every duplicate, ordered by source position.
    let sources = vec![
        recs(&[("k", "from-first"), ("z", "tail")]),
        recs(&[("k", "from-second")]),
        recs(&[("a", "head"), ("k", "from-third")]),
    ];

    let merged = adaptor.union(sources).await?;
    assert_eq!(
        kv_strings(&merged),
        vec![
            ("a".to_string(), "head".to_string()),
            ("k".to_string(), "from-first".to_string()),
            ("k".to_string(), "from-second".to_string()),
            ("k".to_string(), "from-third".to_string()),
            ("z".to_string(), "tail".to_string()),
        ]
    );

    Ok(())
}

async fn empty_sources(adaptor: &(impl SetQueryAdaptor + Sync)) -> Result<()> {
    let merged = adaptor.union(vec![recs(&[]), recs(&[]), recs(&[])]).await?;
    assert!(merged.is_empty());

    let merged = adaptor.union(vec![]).await?;
    assert!(merged.is_empty());

    let merged = adaptor
        .union(vec![recs(&[]), recs(&[("only", "1")]), recs(&[])])
        .await?;
    assert_eq!(key_strings(&merged), vec!["only"]);

    Ok(())
}
