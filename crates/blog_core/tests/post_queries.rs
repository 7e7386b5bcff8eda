mod common;

use blog_core::db::open_db_in_memory;
use blog_core::{
    fetch_with_comments_count, NewTag, Post, PostQuery, PostRepository, SqlitePostRepository,
    SqliteTagRepository, TagQuery, TagRepository,
};
use chrono::{TimeZone, Utc};
use common::{at, comment, like, post, reader, staff};
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};

static EXECUTED_STATEMENTS: AtomicUsize = AtomicUsize::new(0);

fn count_statement(_sql: &str) {
    EXECUTED_STATEMENTS.fetch_add(1, Ordering::SeqCst);
}

/// Runs `work` and returns how many SQL statements it executed on `conn`.
fn statements_executed(conn: &mut Connection, work: impl FnOnce(&Connection)) -> usize {
    conn.trace(Some(count_statement));
    EXECUTED_STATEMENTS.store(0, Ordering::SeqCst);
    work(&*conn);
    let executed = EXECUTED_STATEMENTS.load(Ordering::SeqCst);
    conn.trace(None);
    executed
}

fn bulk_posts(conn: &Connection, author_id: i64, total: i64) {
    conn.execute(
        "INSERT INTO posts (title, text, slug, image, published_at, author_id)
         WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < ?1)
         SELECT 'Post ' || n, 'body', 'post-' || n, 'covers/post.png', n * 1000, ?2 FROM seq;",
        [total, author_id],
    )
    .unwrap();
}

fn titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|post| post.title.as_str()).collect()
}

#[test]
fn year_and_fresh_scenario() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    post(&conn, &author, "A", at(2023, 5, 1));
    post(&conn, &author, "B", at(2024, 1, 10));

    let archive = PostQuery::new().year(2023).fetch_posts(&conn).unwrap();
    assert_eq!(titles(&archive), vec!["A"]);

    let fresh = PostQuery::new().fresh().fetch_posts(&conn).unwrap();
    assert_eq!(titles(&fresh), vec!["B", "A"]);
}

#[test]
fn year_includes_boundaries_and_orders_ascending() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let new_year = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let last_moment = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
    let next_year = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    post(&conn, &author, "Last", last_moment);
    post(&conn, &author, "Next", next_year);
    post(&conn, &author, "First", new_year);
    post(&conn, &author, "Middle", at(2023, 6, 15));

    let archive = PostQuery::new().year(2023).fetch_posts(&conn).unwrap();
    assert_eq!(titles(&archive), vec!["First", "Middle", "Last"]);
    assert!(archive
        .windows(2)
        .all(|pair| pair[0].published_at <= pair[1].published_at));

    assert!(PostQuery::new().year(1999).fetch(&conn).unwrap().is_empty());
    assert!(PostQuery::new().year(i32::MIN).fetch(&conn).unwrap().is_empty());
}

#[test]
fn default_ordering_is_most_recent_first() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    post(&conn, &author, "Old", at(2020, 1, 1));
    post(&conn, &author, "New", at(2022, 1, 1));
    post(&conn, &author, "Mid", at(2021, 1, 1));

    let listed = PostQuery::new().fetch_posts(&conn).unwrap();
    assert_eq!(titles(&listed), vec!["New", "Mid", "Old"]);
}

#[test]
fn popular_posts_rank_by_distinct_likes_with_zero_counts() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let ann = reader(&conn, "ann");
    let bob = reader(&conn, "bob");
    let quiet = post(&conn, &author, "Quiet", at(2023, 1, 1));
    let loved = post(&conn, &author, "Loved", at(2023, 1, 2));
    let liked = post(&conn, &author, "Liked", at(2023, 1, 3));
    like(&conn, &loved, &ann);
    like(&conn, &loved, &bob);
    like(&conn, &loved, &ann);
    like(&conn, &liked, &bob);

    let ranked = PostQuery::new().popular().fetch(&conn).unwrap();
    let summary: Vec<(&str, Option<u64>)> = ranked
        .iter()
        .map(|item| (item.post.title.as_str(), item.likes_count))
        .collect();
    assert_eq!(
        summary,
        vec![("Loved", Some(2)), ("Liked", Some(1)), ("Quiet", Some(0))]
    );
    assert_eq!(ranked[2].post, quiet);

    let plain = PostQuery::new().fetch(&conn).unwrap();
    assert!(plain.iter().all(|item| item.likes_count.is_none()));
}

#[test]
fn popular_composes_with_year_filter() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let fan = reader(&conn, "fan");
    let old_hit = post(&conn, &author, "Old hit", at(2022, 3, 1));
    post(&conn, &author, "Recent", at(2023, 3, 1));
    let recent_hit = post(&conn, &author, "Recent hit", at(2023, 4, 1));
    like(&conn, &old_hit, &fan);
    like(&conn, &recent_hit, &fan);

    let query = PostQuery::new().year(2023).popular();
    let ranked = query.fetch_posts(&conn).unwrap();
    assert_eq!(titles(&ranked), vec!["Recent hit", "Recent"]);
    assert_eq!(query.count(&conn).unwrap(), 2);
}

#[test]
fn query_values_are_restartable_snapshots() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let fan = reader(&conn, "fan");
    let first = post(&conn, &author, "First", at(2023, 1, 1));
    let second = post(&conn, &author, "Second", at(2023, 1, 2));

    let query = PostQuery::new().popular();
    assert_eq!(query.first(&conn).unwrap().unwrap().post, second);

    like(&conn, &first, &fan);
    let again = query.first(&conn).unwrap().unwrap();
    assert_eq!(again.post, first);
    assert_eq!(again.likes_count, Some(1));

    SqlitePostRepository::new(&conn)
        .delete_post(first.id)
        .unwrap();
    assert_eq!(query.count(&conn).unwrap(), 1);
}

#[test]
fn tagged_filter_and_limit() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let one = post(&conn, &author, "One", at(2023, 1, 1));
    let two = post(&conn, &author, "Two", at(2023, 1, 2));
    post(&conn, &author, "Untagged", at(2023, 1, 3));
    let rust = SqliteTagRepository::new(&conn)
        .create_tag(&NewTag::new("rust"))
        .unwrap();
    let posts = SqlitePostRepository::new(&conn);
    posts.set_post_tags(one.id, &[rust.id]).unwrap();
    posts.set_post_tags(two.id, &[rust.id]).unwrap();

    let tagged = PostQuery::new().tagged("RUST").fetch_posts(&conn).unwrap();
    assert_eq!(titles(&tagged), vec!["Two", "One"]);

    let limited = PostQuery::new().tagged("rust").limit(1);
    assert_eq!(titles(&limited.fetch_posts(&conn).unwrap()), vec!["Two"]);
    assert_eq!(limited.count(&conn).unwrap(), 1);
}

#[test]
fn fetch_with_comments_count_attaches_counts_in_input_order() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let fan = reader(&conn, "fan");
    let p1 = post(&conn, &author, "Busy", at(2023, 1, 1));
    let p2 = post(&conn, &author, "Silent", at(2023, 1, 2));
    for day in 2..5 {
        comment(&conn, &p1, &fan, at(2023, 1, day));
    }

    let counted = fetch_with_comments_count(&conn, vec![p1.clone(), p2.clone()]).unwrap();
    assert_eq!(counted.len(), 2);
    assert_eq!(counted[0].post, p1);
    assert_eq!(counted[0].comments_count, 3);
    assert_eq!(counted[1].post, p2);
    assert_eq!(counted[1].comments_count, 0);

    assert!(fetch_with_comments_count(&conn, Vec::new())
        .unwrap()
        .is_empty());
}

#[test]
fn fetch_with_comments_count_defaults_missing_posts_to_zero() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let fan = reader(&conn, "fan");
    let kept = post(&conn, &author, "Kept", at(2023, 1, 1));
    let gone = post(&conn, &author, "Gone", at(2023, 1, 2));
    comment(&conn, &kept, &fan, at(2023, 1, 3));
    comment(&conn, &gone, &fan, at(2023, 1, 3));

    let loaded = PostQuery::new().fresh().fetch_posts(&conn).unwrap();
    SqlitePostRepository::new(&conn)
        .delete_post(gone.id)
        .unwrap();

    let counted = fetch_with_comments_count(&conn, loaded).unwrap();
    let summary: Vec<(&str, u64)> = counted
        .iter()
        .map(|item| (item.post.title.as_str(), item.comments_count))
        .collect();
    assert_eq!(summary, vec![("Gone", 0), ("Kept", 1)]);
}

#[test]
fn prefetch_tags_annotates_tag_popularity() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let first = post(&conn, &author, "First", at(2023, 1, 1));
    let second = post(&conn, &author, "Second", at(2023, 1, 2));
    post(&conn, &author, "Bare", at(2023, 1, 3));
    let tags = SqliteTagRepository::new(&conn);
    let rust = tags.create_tag(&NewTag::new("rust")).unwrap();
    let sql = tags.create_tag(&NewTag::new("sql")).unwrap();
    let posts = SqlitePostRepository::new(&conn);
    posts.set_post_tags(first.id, &[rust.id, sql.id]).unwrap();
    posts.set_post_tags(second.id, &[rust.id]).unwrap();

    let listed = PostQuery::new().prefetch_tags().fetch(&conn).unwrap();
    let summary: Vec<(&str, Vec<(&str, u64)>)> = listed
        .iter()
        .map(|item| {
            let tags: Vec<(&str, u64)> = item
                .tags
                .as_ref()
                .unwrap()
                .iter()
                .map(|tag| (tag.tag.title.as_str(), tag.posts_count))
                .collect();
            (item.post.title.as_str(), tags)
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Bare", vec![]),
            ("Second", vec![("rust", 2)]),
            ("First", vec![("rust", 2), ("sql", 1)]),
        ]
    );

    let without = PostQuery::new().fetch(&conn).unwrap();
    assert!(without.iter().all(|item| item.tags.is_none()));
}

#[test]
fn popular_tags_rank_by_post_count() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let one = post(&conn, &author, "One", at(2023, 1, 1));
    let two = post(&conn, &author, "Two", at(2023, 1, 2));
    let tags = SqliteTagRepository::new(&conn);
    let common_tag = tags.create_tag(&NewTag::new("common")).unwrap();
    let rare = tags.create_tag(&NewTag::new("rare")).unwrap();
    tags.create_tag(&NewTag::new("unused")).unwrap();
    let posts = SqlitePostRepository::new(&conn);
    posts.set_post_tags(one.id, &[common_tag.id, rare.id]).unwrap();
    posts.set_post_tags(two.id, &[common_tag.id]).unwrap();

    let ranked: Vec<(String, u64)> = TagQuery::new()
        .popular()
        .fetch(&conn)
        .unwrap()
        .into_iter()
        .map(|row| (row.tag.title, row.posts_count))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("common".to_string(), 2),
            ("rare".to_string(), 1),
            ("unused".to_string(), 0),
        ]
    );

    let top = TagQuery::new().popular().limit(1).fetch(&conn).unwrap();
    assert_eq!(top[0].tag, common_tag);

    let by_title: Vec<String> = TagQuery::new()
        .fetch(&conn)
        .unwrap()
        .into_iter()
        .map(|row| row.tag.title)
        .collect();
    assert_eq!(by_title, vec!["common", "rare", "unused"]);
}

#[test]
fn listing_items_serialize_for_json_output() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let fan = reader(&conn, "fan");
    let liked = post(&conn, &author, "Liked", at(2023, 1, 1));
    like(&conn, &liked, &fan);

    let items = PostQuery::new().popular().fetch(&conn).unwrap();
    let value = serde_json::to_value(&items[0]).unwrap();
    assert_eq!(value["post"]["slug"], "liked");
    assert_eq!(value["likes_count"], 1);
    assert!(value["tags"].is_null());

    let counted = fetch_with_comments_count(&conn, vec![liked]).unwrap();
    let value = serde_json::to_value(&counted[0]).unwrap();
    assert_eq!(value["comments_count"], 0);
}

#[test]
fn batch_helpers_handle_more_posts_than_bind_variables() {
    let conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let fan = reader(&conn, "fan");
    bulk_posts(&conn, author.id, 40_000);
    let newest = PostQuery::new().first(&conn).unwrap().unwrap().post;
    comment(&conn, &newest, &fan, at(2023, 1, 1));
    let rust = SqliteTagRepository::new(&conn)
        .create_tag(&NewTag::new("rust"))
        .unwrap();
    SqlitePostRepository::new(&conn)
        .set_post_tags(newest.id, &[rust.id])
        .unwrap();

    let posts = PostQuery::new().fetch_posts(&conn).unwrap();
    assert_eq!(posts.len(), 40_000);
    let counted = fetch_with_comments_count(&conn, posts).unwrap();
    assert_eq!(counted.len(), 40_000);
    assert_eq!(counted[0].comments_count, 1);
    assert!(counted[1..].iter().all(|item| item.comments_count == 0));

    let listed = PostQuery::new().prefetch_tags().fetch(&conn).unwrap();
    assert_eq!(listed.len(), 40_000);
    assert_eq!(listed[0].tags.as_ref().unwrap().len(), 1);
    assert!(listed[1..]
        .iter()
        .all(|item| item.tags.as_ref().is_some_and(Vec::is_empty)));
}

#[test]
fn batch_helpers_use_constant_round_trips() {
    let mut conn = open_db_in_memory().unwrap();
    let author = staff(&conn, "editor");
    let fan = reader(&conn, "fan");
    let rust = SqliteTagRepository::new(&conn)
        .create_tag(&NewTag::new("rust"))
        .unwrap();

    let mut per_size = Vec::new();
    for total in [3, 30] {
        while PostQuery::new().count(&conn).unwrap() < total {
            let next = PostQuery::new().count(&conn).unwrap() as u32;
            let created = post(
                &conn,
                &author,
                &format!("Entry {next}"),
                at(2023, 1, 1 + next % 28),
            );
            comment(&conn, &created, &fan, at(2023, 2, 1));
            SqlitePostRepository::new(&conn)
                .set_post_tags(created.id, &[rust.id])
                .unwrap();
        }
        let posts = PostQuery::new().fetch_posts(&conn).unwrap();

        let counting = statements_executed(&mut conn, |conn| {
            let counted = fetch_with_comments_count(conn, posts).unwrap();
            assert!(counted.iter().all(|item| item.comments_count == 1));
        });
        let prefetching = statements_executed(&mut conn, |conn| {
            let listed = PostQuery::new().prefetch_tags().fetch(conn).unwrap();
            assert!(listed
                .iter()
                .all(|item| item.tags.as_ref().map(Vec::len) == Some(1)));
        });
        per_size.push((counting, prefetching));
    }

    assert_eq!(per_size, vec![(1, 2), (1, 2)]);
}
