use super::helpers::adaptor::SetQueryAdaptor;
use super::helpers::fixtures::{key_strings, kv_strings, recs};
use anyhow::Result;

pub async fn test_intersect(adaptor: &(impl SetQueryAdaptor + Sync)) -> Result<()> {
    agreement_across_all_sources(adaptor).await?;
    emitted_records_come_from_the_primary(adaptor).await?;
    key_sets_are_symmetric(adaptor).await?;
    any_empty_source_empties_the_result(adaptor).await?;

    Ok(())
}

async fn agreement_across_all_sources(adaptor: &(impl SetQueryAdaptor + Sync)) -> Result<()> {
    let sources = vec![
        recs(&[("a", "1"), ("c", "1"), ("e", "1"), ("g", "1")]),
        recs(&[("c", "2"), ("d", "2"), ("g", "2")]),
        recs(&[("b", "3"), ("c", "3"), ("g", "3"), ("z", "3")]),
    ];

    let matched = adaptor.intersect(sources).await?;
    assert_eq!(key_strings(&matched), vec!["c", "g"]);

    Ok(())
}

async fn emitted_records_come_from_the_primary(
    adaptor: &(impl SetQueryAdaptor + Sync),
) -> Result<()> {
    let sources = vec![
        recs(&[("m", "primary-value")]),
        recs(&[("m", "other-value")]),
    ];

    let matched = adaptor.intersect(sources).await?;
    assert_eq!(
        kv_strings(&matched),
        vec![("m".to_string(), "primary-value".to_string())]
    );

    Ok(())
}

async fn key_sets_are_symmetric(adaptor: &(impl SetQueryAdaptor + Sync)) -> Result<()> {
    let a = recs(&[("1", "a"), ("3", "a"), ("5", "a")]);
    let b = recs(&[("3", "b"), ("5", "b"), ("7", "b")]);

    let a_first = adaptor.intersect(vec![a.clone(), b.clone()]).await?;
    let b_first = adaptor.intersect(vec![b, a]).await?;

    assert_eq!(key_strings(&a_first), vec!["3", "5"]);
    assert_eq!(key_strings(&a_first), key_strings(&b_first));

    // The emitted records follow whichever source is primary.
    assert_eq!(
        kv_strings(&a_first)[0].1,
        "a".to_string(),
    );
    assert_eq!(
        kv_strings(&b_first)[0].1,
        "b".to_string(),
    );

    Ok(())
}

async fn any_empty_source_empties_the_result(
    adaptor: &(impl SetQueryAdaptor + Sync),
) -> Result<()> {
    let matched = adaptor
        .intersect(vec![recs(&[("a", "1"), ("b", "1")]), recs(&[])])
        .await?;
    assert!(matched.is_empty());

    let matched = adaptor
        .intersect(vec![recs(&[]), recs(&[("a", "1")])])
        .await?;
    assert!(matched.is_empty());

    Ok(())
}
