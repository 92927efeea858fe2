//! Integration tests for `DieselUserRepository` against PostgreSQL.
//!
//! Each test gets a temporary database on the shared embedded cluster, with
//! the embedded migrations applied. Rows are still tagged per test so the
//! suite also runs against a shared `USER_API_TEST_DATABASE_URL` database.
//!
//! The cluster bootstraps synchronously, so tests drive their own Tokio
//! runtime instead of using `#[tokio::test]`.

mod support;

use chrono::{TimeDelta, TimeZone, Utc};
use rstest::rstest;
use tokio::runtime::Runtime;
use user_api::domain::ports::{UserPersistenceError, UserRepository};
use user_api::domain::{NewUser, Score, User, UserChanges, UserId, UserListParams};
use user_api::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use uuid::Uuid;

use support::{TestDatabase, test_database};

/// Bind `_database` first so it drops after the pool and runtime.
struct Harness {
    runtime: Runtime,
    repo: DieselUserRepository,
    tag: String,
    _database: TestDatabase,
}

fn harness() -> Option<Harness> {
    let database = test_database()?;
    let url = database.url();
    let runtime = Runtime::new().expect("tokio runtime");
    let repo = runtime.block_on(async {
        run_pending_migrations(&url).await.expect("migrations apply");
        let pool = DbPool::new(PoolConfig::new(url.as_str()).with_max_size(4))
            .await
            .expect("pool builds");
        DieselUserRepository::new(pool)
    });
    Some(Harness {
        runtime,
        repo,
        tag: Uuid::new_v4().simple().to_string(),
        _database: database,
    })
}

fn user(tag: &str, name: &str, score: i64, offset_secs: i64) -> User {
    let at = Utc
        .with_ymd_and_hms(2026, 4, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
        + TimeDelta::seconds(offset_secs);
    let input = NewUser::try_from_strings(
        format!("{tag} {name}"),
        format!("{name}@{tag}.example"),
        Some(score),
    )
    .expect("valid input");
    User::create(UserId::random(), input, at)
}

#[rstest]
fn insert_find_update_delete_round_trip() {
    let Some(Harness { _database, runtime, repo, tag }) = harness() else {
        return;
    };
    runtime.block_on(async {
        let original = user(&tag, "ada", 10, 0);
        repo.insert(&original).await.expect("insert succeeds");

        let fetched = repo.find_by_id(original.id()).await.expect("lookup");
        assert_eq!(fetched.as_ref(), Some(&original));

        let changes = UserChanges::try_new(None, None, Some(Score::new(99).expect("score")))
            .expect("non-empty changes");
        let later = original.created_at() + TimeDelta::seconds(30);
        let updated = repo
            .update(original.id(), &changes, later)
            .await
            .expect("update runs")
            .expect("row matched");
        assert_eq!(updated, original.clone().apply(&changes, later));

        assert!(repo.delete(original.id()).await.expect("delete runs"));
        assert_eq!(repo.find_by_id(original.id()).await.expect("lookup"), None);
        assert!(!repo.delete(original.id()).await.expect("second delete runs"));
    });
}

#[rstest]
fn unique_email_constraint_surfaces_as_duplicate() {
    let Some(Harness { _database, runtime, repo, tag }) = harness() else {
        return;
    };
    runtime.block_on(async {
        let first = user(&tag, "ada", 10, 0);
        repo.insert(&first).await.expect("insert succeeds");

        let clash = User::create(
            UserId::random(),
            NewUser::try_from_strings("Other", first.email().as_ref(), None)
                .expect("valid input"),
            first.created_at(),
        );
        let error = repo.insert(&clash).await.expect_err("duplicate email");
        assert_eq!(error, UserPersistenceError::DuplicateEmail);

        let second = user(&tag, "grace", 20, 1);
        repo.insert(&second).await.expect("insert succeeds");
        let steal = UserChanges::try_new(None, Some(first.email().clone()), None)
            .expect("non-empty changes");
        let error = repo
            .update(second.id(), &steal, second.created_at())
            .await
            .expect_err("duplicate email on update");
        assert_eq!(error, UserPersistenceError::DuplicateEmail);
    });
}

#[rstest]
fn list_filters_sorts_and_counts_in_sql() {
    let Some(Harness { _database, runtime, repo, tag }) = harness() else {
        return;
    };
    runtime.block_on(async {
        for (index, (name, score)) in [("low", 10), ("mid", 50), ("high", 90), ("top_50%", 95)]
            .into_iter()
            .enumerate()
        {
            let offset = i64::try_from(index).expect("small index");
            repo.insert(&user(&tag, name, score, offset))
                .await
                .expect("insert succeeds");
        }

        let params = UserListParams {
            name: Some(tag.to_uppercase()),
            min_score: Some("40".to_owned()),
            sort_by: Some("score".to_owned()),
            sort_order: Some("asc".to_owned()),
            limit: Some("2".to_owned()),
            ..UserListParams::default()
        };
        let page = repo
            .list(&params.parse().expect("valid params"))
            .await
            .expect("list runs");

        assert_eq!(page.total, 3);
        let scores: Vec<u8> = page.users.iter().map(|u| u.score().value()).collect();
        assert_eq!(scores, vec![50, 90]);

        let literal = UserListParams {
            name: Some("_50%".to_owned()),
            ..UserListParams::default()
        };
        let escaped = repo
            .list(&literal.parse().expect("valid params"))
            .await
            .expect("list runs");
        assert!(!escaped.users.is_empty());
        assert!(
            escaped
                .users
                .iter()
                .all(|u| u.name().as_ref().contains("_50%"))
        );
    });
}

#[rstest]
fn equal_sort_keys_fall_back_to_id_order() {
    let Some(Harness { _database, runtime, repo, tag }) = harness() else {
        return;
    };
    runtime.block_on(async {
        let mut inserted = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let record = user(&tag, name, 50, 0);
            repo.insert(&record).await.expect("insert succeeds");
            inserted.push(*record.id());
        }
        inserted.sort();

        let mut seen = Vec::new();
        for page in ["1", "2"] {
            let params = UserListParams {
                name: Some(tag.clone()),
                sort_by: Some("score".to_owned()),
                limit: Some("2".to_owned()),
                page: Some(page.to_owned()),
                ..UserListParams::default()
            };
            let listed = repo
                .list(&params.parse().expect("valid params"))
                .await
                .expect("list runs");
            assert_eq!(listed.total, 4);
            seen.extend(listed.users.iter().map(|u| *u.id()));
        }

        assert_eq!(seen, inserted);
    });
}
