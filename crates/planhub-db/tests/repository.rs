//! Repository integration tests against an in-memory SurrealDB.

use planhub_core::error::PlanhubError;
use planhub_core::models::board::CreateBoard;
use planhub_core::models::checklist::CreateChecklist;
use planhub_core::models::comment::CreateComment;
use planhub_core::models::member::{CreateMember, OrganizationRole};
use planhub_core::models::organization::{CreateOrganization, UpdateOrganization};
use planhub_core::models::project::CreateProject;
use planhub_core::models::status::{CreateTaskStatus, StatusOrder};
use planhub_core::models::tag::CreateTag;
use planhub_core::models::task::{CreateTask, TaskPriority};
use planhub_core::models::user::CreateUser;
use planhub_core::repository::*;
use planhub_db::repository::*;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    planhub_db::run_migrations(&db).await.unwrap();
    db
}

async fn seed_user(db: &Surreal<Db>, email: &str) -> Uuid {
    SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            email: email.into(),
            name: "Test User".into(),
            avatar_url: None,
        })
        .await
        .unwrap()
        .id
}

async fn seed_board(db: &Surreal<Db>) -> (Uuid, Uuid, Uuid) {
    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Acme".into(),
            description: None,
        })
        .await
        .unwrap();
    let project = SurrealProjectRepository::new(db.clone())
        .create(CreateProject {
            organization_id: org.id,
            name: "Website".into(),
            description: None,
            color_theme: None,
        })
        .await
        .unwrap();
    let board = SurrealBoardRepository::new(db.clone())
        .create(CreateBoard {
            project_id: project.id,
            name: "Sprint".into(),
            description: None,
            view_type: None,
        })
        .await
        .unwrap();
    (org.id, project.id, board.id)
}

async fn seed_status(db: &Surreal<Db>, board_id: Uuid, name: &str, index: i64) -> Uuid {
    SurrealStatusRepository::new(db.clone())
        .create(CreateTaskStatus {
            board_id,
            name: name.into(),
            color: None,
            order_index: index,
            is_final: None,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = setup().await;
    planhub_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn user_roundtrip_and_email_lookup() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db.clone());

    let created = repo
        .create(CreateUser {
            email: "alice@example.com".into(),
            name: "Alice".into(),
            avatar_url: None,
        })
        .await
        .unwrap();

    let by_id = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(by_id.email, "alice@example.com");
    assert!(!by_id.email_verified);

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, created.id);
}

#[tokio::test]
async fn duplicate_email_is_a_validation_error() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db.clone());

    seed_user(&db, "bob@example.com").await;
    let err = repo
        .create(CreateUser {
            email: "bob@example.com".into(),
            name: "Bob 2".into(),
            avatar_url: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PlanhubError::Validation { .. }));
}

#[tokio::test]
async fn missing_organization_is_not_found() {
    let db = setup().await;
    let err = SurrealOrganizationRepository::new(db.clone())
        .get_by_id(Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PlanhubError::NotFound { .. }));
}

#[tokio::test]
async fn organization_update_is_partial() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db.clone());

    let org = repo
        .create(CreateOrganization {
            name: "Acme".into(),
            description: Some("old".into()),
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            org.id,
            UpdateOrganization {
                name: Some("Acme Corp".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Acme Corp");
    assert_eq!(updated.description.as_deref(), Some("old"));
}

#[tokio::test]
async fn membership_find_and_owner_count() {
    let db = setup().await;
    let (org_id, _, _) = seed_board(&db).await;
    let owner = seed_user(&db, "owner@example.com").await;
    let viewer = seed_user(&db, "viewer@example.com").await;
    let repo = SurrealMemberRepository::new(db.clone());

    repo.create(CreateMember {
        organization_id: org_id,
        user_id: owner,
        role: OrganizationRole::Owner,
        invited_by: None,
    })
    .await
    .unwrap();
    repo.create(CreateMember {
        organization_id: org_id,
        user_id: viewer,
        role: OrganizationRole::Viewer,
        invited_by: Some(owner),
    })
    .await
    .unwrap();

    let found = repo.find(org_id, viewer).await.unwrap().unwrap();
    assert_eq!(found.role, OrganizationRole::Viewer);
    assert_eq!(found.invited_by, Some(owner));

    assert!(repo.find(org_id, Uuid::new_v4()).await.unwrap().is_none());
    assert_eq!(repo.count_by_organization(org_id).await.unwrap(), 2);
    assert_eq!(repo.count_owners(org_id).await.unwrap(), 1);

    let promoted = repo
        .update_role(org_id, viewer, OrganizationRole::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.role, OrganizationRole::Admin);

    repo.delete(org_id, viewer).await.unwrap();
    assert_eq!(repo.count_by_organization(org_id).await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_membership_is_a_validation_error() {
    let db = setup().await;
    let (org_id, _, _) = seed_board(&db).await;
    let user = seed_user(&db, "dup@example.com").await;
    let repo = SurrealMemberRepository::new(db.clone());

    let member = CreateMember {
        organization_id: org_id,
        user_id: user,
        role: OrganizationRole::Member,
        invited_by: None,
    };
    repo.create(member.clone()).await.unwrap();
    let err = repo.create(member).await.unwrap_err();

    assert!(matches!(err, PlanhubError::Validation { .. }));
}

#[tokio::test]
async fn statuses_are_ordered_and_board_scoped() {
    let db = setup().await;
    let (_, _, board_id) = seed_board(&db).await;
    let repo = SurrealStatusRepository::new(db.clone());

    seed_status(&db, board_id, "Done", 2).await;
    seed_status(&db, board_id, "To Do", 0).await;
    seed_status(&db, board_id, "In Progress", 1).await;

    let statuses = repo.find_by_board(board_id).await.unwrap();
    let names: Vec<_> = statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["To Do", "In Progress", "Done"]);

    let found = repo
        .find_by_board_and_name(board_id, "Done")
        .await
        .unwrap();
    assert!(found.is_some());
    assert!(
        repo.find_by_board_and_name(Uuid::new_v4(), "Done")
            .await
            .unwrap()
            .is_none()
    );

    let at_index = repo
        .find_by_board_and_order_index(board_id, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(at_index.name, "In Progress");
}

#[tokio::test]
async fn duplicate_status_name_is_a_validation_error() {
    let db = setup().await;
    let (_, _, board_id) = seed_board(&db).await;
    let repo = SurrealStatusRepository::new(db.clone());

    seed_status(&db, board_id, "To Do", 0).await;
    let err = repo
        .create(CreateTaskStatus {
            board_id,
            name: "To Do".into(),
            color: None,
            order_index: 5,
            is_final: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PlanhubError::Validation { .. }));
}

#[tokio::test]
async fn promote_demotes_and_rewrites_task_completion_together() {
    let db = setup().await;
    let (_, _, board_id) = seed_board(&db).await;
    let creator = seed_user(&db, "creator@example.com").await;
    let statuses = SurrealStatusRepository::new(db.clone());
    let tasks = SurrealTaskRepository::new(db.clone());

    let done = statuses
        .create(CreateTaskStatus {
            board_id,
            name: "Done".into(),
            color: None,
            order_index: 0,
            is_final: Some(true),
        })
        .await
        .unwrap();
    let archived = statuses
        .create(CreateTaskStatus {
            board_id,
            name: "Archived".into(),
            color: None,
            order_index: 1,
            is_final: None,
        })
        .await
        .unwrap();

    // A completed task in Done and a not-yet-completed one in Archived.
    let mut shipped = tasks
        .create(CreateTask {
            board_id,
            status_id: done.id,
            title: "Shipped".into(),
            description: None,
            priority: None,
            due_date: None,
            order_index: None,
            creator_id: creator,
            assignee_id: None,
        })
        .await
        .unwrap();
    shipped.apply_completion(true, chrono::Utc::now());
    let shipped = tasks.save(shipped).await.unwrap();
    let stale = tasks
        .create(CreateTask {
            board_id,
            status_id: archived.id,
            title: "Stale".into(),
            description: None,
            priority: None,
            due_date: None,
            order_index: None,
            creator_id: creator,
            assignee_id: None,
        })
        .await
        .unwrap();

    let now = chrono::Utc::now();
    let demoted = statuses.promote(board_id, archived.id, now).await.unwrap();
    assert_eq!(demoted.len(), 1);
    assert_eq!(demoted[0].id, done.id);
    assert!(!statuses.get_by_id(done.id).await.unwrap().is_final);

    // The demoted status's task was uncompleted and the promoted one's
    // completed in the same call.
    let shipped = tasks.get_by_id(shipped.id).await.unwrap();
    assert!(!shipped.is_completed);
    assert!(shipped.completed_at.is_none());
    let stale = tasks.get_by_id(stale.id).await.unwrap();
    assert!(stale.is_completed);
    assert!(stale.completed_at.is_some());
    let first_completed_at = stale.completed_at;

    // Nothing left to demote; a repeat keeps the completion timestamp.
    let again = statuses.promote(board_id, archived.id, chrono::Utc::now()).await.unwrap();
    assert!(again.is_empty());
    let stale = tasks.get_by_id(stale.id).await.unwrap();
    assert_eq!(stale.completed_at, first_completed_at);
}

#[tokio::test]
async fn apply_order_swaps_without_tripping_unique_index() {
    let db = setup().await;
    let (_, _, board_id) = seed_board(&db).await;
    let repo = SurrealStatusRepository::new(db.clone());

    let a = seed_status(&db, board_id, "A", 0).await;
    let b = seed_status(&db, board_id, "B", 1).await;

    repo.apply_order(
        board_id,
        vec![
            StatusOrder {
                status_id: a,
                order_index: 1,
            },
            StatusOrder {
                status_id: b,
                order_index: 0,
            },
        ],
    )
    .await
    .unwrap();

    let statuses = repo.find_by_board(board_id).await.unwrap();
    let names: Vec<_> = statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);
}

#[tokio::test]
async fn task_save_persists_completion_pair() {
    let db = setup().await;
    let (_, _, board_id) = seed_board(&db).await;
    let status_id = seed_status(&db, board_id, "To Do", 0).await;
    let creator = seed_user(&db, "creator@example.com").await;
    let repo = SurrealTaskRepository::new(db.clone());

    let mut task = repo
        .create(CreateTask {
            board_id,
            status_id,
            title: "Write docs".into(),
            description: None,
            priority: Some(TaskPriority::High),
            due_date: None,
            order_index: None,
            creator_id: creator,
            assignee_id: None,
        })
        .await
        .unwrap();
    assert!(!task.is_completed);
    assert_eq!(task.priority, TaskPriority::High);

    task.apply_completion(true, chrono::Utc::now());
    let saved = repo.save(task.clone()).await.unwrap();
    assert!(saved.is_completed);
    assert!(saved.completed_at.is_some());

    let reloaded = repo.get_by_id(task.id).await.unwrap();
    assert!(reloaded.is_completed);
    assert_eq!(repo.count_by_status(status_id).await.unwrap(), 1);
}

#[tokio::test]
async fn task_delete_cascades_to_children() {
    let db = setup().await;
    let (_, project_id, board_id) = seed_board(&db).await;
    let status_id = seed_status(&db, board_id, "To Do", 0).await;
    let creator = seed_user(&db, "creator@example.com").await;
    let tasks = SurrealTaskRepository::new(db.clone());
    let checklists = SurrealChecklistRepository::new(db.clone());
    let comments = SurrealCommentRepository::new(db.clone());
    let tags = SurrealTagRepository::new(db.clone());

    let task = tasks
        .create(CreateTask {
            board_id,
            status_id,
            title: "Doomed".into(),
            description: None,
            priority: None,
            due_date: None,
            order_index: None,
            creator_id: creator,
            assignee_id: None,
        })
        .await
        .unwrap();

    checklists
        .create(CreateChecklist {
            task_id: task.id,
            title: "Step 1".into(),
            order_index: None,
        })
        .await
        .unwrap();
    comments
        .create(CreateComment {
            task_id: task.id,
            author_id: creator,
            content: "On it".into(),
        })
        .await
        .unwrap();
    let tag = tags
        .create(CreateTag {
            project_id,
            name: "urgent".into(),
            color: None,
        })
        .await
        .unwrap();
    tags.attach_to_task(task.id, tag.id).await.unwrap();

    tasks.delete(task.id).await.unwrap();

    assert!(matches!(
        tasks.get_by_id(task.id).await.unwrap_err(),
        PlanhubError::NotFound { .. }
    ));
    assert!(checklists.find_by_task(task.id).await.unwrap().is_empty());
    assert!(comments.find_by_task(task.id).await.unwrap().is_empty());
    assert!(tags.find_by_task(task.id).await.unwrap().is_empty());
    // The tag itself survives; only the edge is removed.
    assert_eq!(tags.get_by_id(tag.id).await.unwrap().id, tag.id);
}

#[tokio::test]
async fn attach_twice_is_a_noop() {
    let db = setup().await;
    let (_, project_id, board_id) = seed_board(&db).await;
    let status_id = seed_status(&db, board_id, "To Do", 0).await;
    let creator = seed_user(&db, "creator@example.com").await;
    let tags = SurrealTagRepository::new(db.clone());

    let task = SurrealTaskRepository::new(db.clone())
        .create(CreateTask {
            board_id,
            status_id,
            title: "Tagged".into(),
            description: None,
            priority: None,
            due_date: None,
            order_index: None,
            creator_id: creator,
            assignee_id: None,
        })
        .await
        .unwrap();
    let tag = tags
        .create(CreateTag {
            project_id,
            name: "backend".into(),
            color: None,
        })
        .await
        .unwrap();

    tags.attach_to_task(task.id, tag.id).await.unwrap();
    tags.attach_to_task(task.id, tag.id).await.unwrap();

    assert_eq!(tags.find_by_task(task.id).await.unwrap().len(), 1);

    tags.detach_from_task(task.id, tag.id).await.unwrap();
    assert!(tags.find_by_task(task.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn comments_are_newest_first() {
    let db = setup().await;
    let (_, _, board_id) = seed_board(&db).await;
    let status_id = seed_status(&db, board_id, "To Do", 0).await;
    let author = seed_user(&db, "author@example.com").await;
    let comments = SurrealCommentRepository::new(db.clone());

    let task = SurrealTaskRepository::new(db.clone())
        .create(CreateTask {
            board_id,
            status_id,
            title: "Discussed".into(),
            description: None,
            priority: None,
            due_date: None,
            order_index: None,
            creator_id: author,
            assignee_id: None,
        })
        .await
        .unwrap();

    for content in ["first", "second"] {
        comments
            .create(CreateComment {
                task_id: task.id,
                author_id: author,
                content: content.into(),
            })
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let listed = comments.find_by_task(task.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].content, "second");

    // Scoped lookup misses when the comment belongs to another task.
    assert!(
        comments
            .find_by_task_and_id(Uuid::new_v4(), listed[0].id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn organization_delete_cascades_through_the_tree() {
    let db = setup().await;
    let (org_id, project_id, board_id) = seed_board(&db).await;
    let status_id = seed_status(&db, board_id, "To Do", 0).await;
    let creator = seed_user(&db, "creator@example.com").await;

    SurrealMemberRepository::new(db.clone())
        .create(CreateMember {
            organization_id: org_id,
            user_id: creator,
            role: OrganizationRole::Owner,
            invited_by: None,
        })
        .await
        .unwrap();
    SurrealTaskRepository::new(db.clone())
        .create(CreateTask {
            board_id,
            status_id,
            title: "Gone with the org".into(),
            description: None,
            priority: None,
            due_date: None,
            order_index: None,
            creator_id: creator,
            assignee_id: None,
        })
        .await
        .unwrap();

    SurrealOrganizationRepository::new(db.clone())
        .delete(org_id)
        .await
        .unwrap();

    assert!(
        SurrealProjectRepository::new(db.clone())
            .list_by_organization(org_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        SurrealBoardRepository::new(db.clone())
            .list_by_project(project_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        SurrealStatusRepository::new(db.clone())
            .find_by_board(board_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        SurrealTaskRepository::new(db.clone())
            .find_by_board(board_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        SurrealMemberRepository::new(db.clone())
            .find(org_id, creator)
            .await
            .unwrap()
            .is_none()
    );
    // Users are global and survive organization deletion.
    SurrealUserRepository::new(db.clone())
        .get_by_id(creator)
        .await
        .unwrap();
}
