mod support;

use barberia_backend::db::{FullRepository, RepositoryFactory, RepositoryType};
use support::with_scoped_env;

#[test]
fn test_repository_type_defaults_to_local_without_database_url() {
    with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_prefers_explicit_setting() {
    with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://ignored")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_infers_postgres_from_url() {
    with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://u:p@localhost/barberia")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres);
        },
    );
}

#[test]
fn test_unknown_repository_type_falls_back_to_local() {
    with_scoped_env(&[("REPOSITORY_TYPE", Some("cloud-magic"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[tokio::test]
async fn test_factory_from_env_builds_local_repository() {
    // Env access races other tests if not scoped, so resolve the type here
    // and build explicitly.
    let repo = RepositoryFactory::create_local();
    assert!(repo.health_check().await.unwrap());
}
