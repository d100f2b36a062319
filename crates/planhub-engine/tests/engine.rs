//! End-to-end service tests against an in-memory SurrealDB.

use planhub_core::error::PlanhubError;
use planhub_core::models::board::CreateBoard;
use planhub_core::models::member::OrganizationRole;
use planhub_core::models::organization::CreateOrganization;
use planhub_core::models::project::CreateProject;
use planhub_core::models::status::{CreateTaskStatus, StatusOrder, UpdateTaskStatus};
use planhub_core::models::task::{CreateTask, Task, UpdateTask};
use planhub_core::models::user::CreateUser;
use planhub_core::repository::{StatusRepository, TaskRepository, UserRepository};
use planhub_db::repository::*;
use planhub_engine::access::AccessChain;
use planhub_engine::{
    BoardService, ChecklistService, CommentService, OrganizationService, ProjectService,
    TaskService,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    planhub_db::run_migrations(&db).await.unwrap();
    db
}

fn chain(
    db: &Surreal<Db>,
) -> AccessChain<
    SurrealOrganizationRepository<Db>,
    SurrealProjectRepository<Db>,
    SurrealBoardRepository<Db>,
    SurrealMemberRepository<Db>,
> {
    AccessChain::new(
        SurrealOrganizationRepository::new(db.clone()),
        SurrealProjectRepository::new(db.clone()),
        SurrealBoardRepository::new(db.clone()),
        SurrealMemberRepository::new(db.clone()),
    )
}

fn organizations(
    db: &Surreal<Db>,
) -> OrganizationService<
    SurrealOrganizationRepository<Db>,
    SurrealMemberRepository<Db>,
    SurrealUserRepository<Db>,
> {
    OrganizationService::new(
        SurrealOrganizationRepository::new(db.clone()),
        SurrealMemberRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
    )
}

fn projects(
    db: &Surreal<Db>,
) -> ProjectService<
    SurrealOrganizationRepository<Db>,
    SurrealProjectRepository<Db>,
    SurrealMemberRepository<Db>,
    SurrealTagRepository<Db>,
> {
    ProjectService::new(
        SurrealOrganizationRepository::new(db.clone()),
        SurrealProjectRepository::new(db.clone()),
        SurrealMemberRepository::new(db.clone()),
        SurrealTagRepository::new(db.clone()),
    )
}

fn boards(
    db: &Surreal<Db>,
) -> BoardService<
    SurrealOrganizationRepository<Db>,
    SurrealProjectRepository<Db>,
    SurrealBoardRepository<Db>,
    SurrealMemberRepository<Db>,
    SurrealStatusRepository<Db>,
    SurrealTaskRepository<Db>,
> {
    BoardService::new(
        chain(db),
        SurrealBoardRepository::new(db.clone()),
        SurrealStatusRepository::new(db.clone()),
        SurrealTaskRepository::new(db.clone()),
    )
}

fn tasks(
    db: &Surreal<Db>,
) -> TaskService<
    SurrealOrganizationRepository<Db>,
    SurrealProjectRepository<Db>,
    SurrealBoardRepository<Db>,
    SurrealMemberRepository<Db>,
    SurrealStatusRepository<Db>,
    SurrealTaskRepository<Db>,
    SurrealUserRepository<Db>,
    SurrealTagRepository<Db>,
> {
    TaskService::new(
        chain(db),
        SurrealStatusRepository::new(db.clone()),
        SurrealTaskRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealTagRepository::new(db.clone()),
    )
}

fn comments(
    db: &Surreal<Db>,
) -> CommentService<
    SurrealOrganizationRepository<Db>,
    SurrealProjectRepository<Db>,
    SurrealBoardRepository<Db>,
    SurrealMemberRepository<Db>,
    SurrealTaskRepository<Db>,
    SurrealCommentRepository<Db>,
> {
    CommentService::new(
        chain(db),
        SurrealTaskRepository::new(db.clone()),
        SurrealCommentRepository::new(db.clone()),
    )
}

fn checklists(
    db: &Surreal<Db>,
) -> ChecklistService<
    SurrealOrganizationRepository<Db>,
    SurrealProjectRepository<Db>,
    SurrealBoardRepository<Db>,
    SurrealMemberRepository<Db>,
    SurrealTaskRepository<Db>,
    SurrealChecklistRepository<Db>,
> {
    ChecklistService::new(
        chain(db),
        SurrealTaskRepository::new(db.clone()),
        SurrealChecklistRepository::new(db.clone()),
    )
}

async fn seed_user(db: &Surreal<Db>, email: &str) -> Uuid {
    SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            email: email.into(),
            name: email.split('@').next().unwrap().into(),
            avatar_url: None,
        })
        .await
        .unwrap()
        .id
}

/// Owner, organization, project, board (with default statuses).
async fn seed_workspace(db: &Surreal<Db>) -> (Uuid, Uuid, Uuid, Uuid) {
    let owner = seed_user(db, "owner@example.com").await;
    let org = organizations(db)
        .create(
            owner,
            CreateOrganization {
                name: "Acme".into(),
                description: None,
            },
        )
        .await
        .unwrap();
    let project = projects(db)
        .create(
            owner,
            CreateProject {
                organization_id: org.id,
                name: "Website".into(),
                description: None,
                color_theme: None,
            },
        )
        .await
        .unwrap();
    let board = boards(db)
        .create_board(
            owner,
            CreateBoard {
                project_id: project.id,
                name: "Sprint".into(),
                description: None,
                view_type: None,
            },
        )
        .await
        .unwrap();
    (owner, org.id, project.id, board.id)
}

async fn status_id_by_name(db: &Surreal<Db>, board_id: Uuid, name: &str) -> Uuid {
    SurrealStatusRepository::new(db.clone())
        .find_by_board_and_name(board_id, name)
        .await
        .unwrap()
        .unwrap()
        .id
}

async fn seed_task(db: &Surreal<Db>, user: Uuid, board_id: Uuid, status_id: Uuid) -> Task {
    tasks(db)
        .create(
            user,
            CreateTask {
                board_id,
                status_id,
                title: "Task".into(),
                description: None,
                priority: None,
                due_date: None,
                order_index: None,
                creator_id: user,
                assignee_id: None,
            },
        )
        .await
        .unwrap()
}

// -- status engine ------------------------------------------------------

#[tokio::test]
async fn new_board_gets_default_statuses_with_done_final() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;

    let statuses = boards(&db).list_statuses(board_id, owner).await.unwrap();
    let names: Vec<_> = statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["To Do", "In Progress", "Done"]);
    let finals: Vec<_> = statuses.iter().filter(|s| s.is_final).collect();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].name, "Done");
}

#[tokio::test]
async fn promoting_a_new_final_status_demotes_the_old_one() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let svc = boards(&db);

    let archived = svc
        .create_status(
            owner,
            CreateTaskStatus {
                board_id,
                name: "Archived".into(),
                color: None,
                order_index: 3,
                is_final: Some(true),
            },
        )
        .await
        .unwrap();
    assert!(archived.is_final);

    let statuses = svc.list_statuses(board_id, owner).await.unwrap();
    let finals: Vec<_> = statuses.iter().filter(|s| s.is_final).collect();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].name, "Archived");
}

#[tokio::test]
async fn archived_promotion_uncompletes_tasks_left_in_done() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let done = status_id_by_name(&db, board_id, "Done").await;

    let task = seed_task(&db, owner, board_id, done).await;
    assert!(task.is_completed);
    assert!(task.completed_at.is_some());

    boards(&db)
        .create_status(
            owner,
            CreateTaskStatus {
                board_id,
                name: "Archived".into(),
                color: None,
                order_index: 3,
                is_final: Some(true),
            },
        )
        .await
        .unwrap();

    // Done lost its final flag, so its tasks are no longer completed.
    let reloaded = tasks(&db).get(task.id, owner).await.unwrap();
    assert!(!reloaded.is_completed);
    assert!(reloaded.completed_at.is_none());
}

#[tokio::test]
async fn update_status_final_flag_syncs_tasks_both_ways() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let svc = boards(&db);

    let task = seed_task(&db, owner, board_id, todo).await;
    assert!(!task.is_completed);

    // Promote To Do: its tasks complete, Done is demoted.
    svc.update_status(
        owner,
        board_id,
        todo,
        UpdateTaskStatus {
            is_final: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let completed = tasks(&db).get(task.id, owner).await.unwrap();
    assert!(completed.is_completed);

    let statuses = svc.list_statuses(board_id, owner).await.unwrap();
    assert_eq!(statuses.iter().filter(|s| s.is_final).count(), 1);

    // Demote it again: the tasks flip back.
    svc.update_status(
        owner,
        board_id,
        todo,
        UpdateTaskStatus {
            is_final: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let uncompleted = tasks(&db).get(task.id, owner).await.unwrap();
    assert!(!uncompleted.is_completed);
    assert!(uncompleted.completed_at.is_none());
}

#[tokio::test]
async fn delete_status_is_blocked_while_tasks_remain() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let svc = boards(&db);

    let task = seed_task(&db, owner, board_id, todo).await;

    let err = svc.delete_status(owner, board_id, todo).await.unwrap_err();
    assert!(matches!(
        err,
        PlanhubError::BusinessLogic { message } if message.contains("existing tasks")
    ));
    // The status survives the failed delete.
    assert_eq!(svc.list_statuses(board_id, owner).await.unwrap().len(), 3);

    tasks(&db).delete(owner, task.id).await.unwrap();
    svc.delete_status(owner, board_id, todo).await.unwrap();
    assert_eq!(svc.list_statuses(board_id, owner).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reorder_swaps_and_returns_sorted_list() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let in_progress = status_id_by_name(&db, board_id, "In Progress").await;

    let reordered = boards(&db)
        .reorder_statuses(
            owner,
            board_id,
            vec![
                StatusOrder {
                    status_id: todo,
                    order_index: 1,
                },
                StatusOrder {
                    status_id: in_progress,
                    order_index: 0,
                },
            ],
        )
        .await
        .unwrap();

    let names: Vec<_> = reordered.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["In Progress", "To Do", "Done"]);
}

#[tokio::test]
async fn reorder_rejects_duplicates_and_empty_batches() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let in_progress = status_id_by_name(&db, board_id, "In Progress").await;
    let svc = boards(&db);

    let err = svc
        .reorder_statuses(owner, board_id, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::Validation { .. }));

    let err = svc
        .reorder_statuses(
            owner,
            board_id,
            vec![
                StatusOrder {
                    status_id: todo,
                    order_index: 5,
                },
                StatusOrder {
                    status_id: in_progress,
                    order_index: 5,
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlanhubError::Validation { message } if message.contains("Duplicate order index")
    ));

    // Nothing was applied.
    let names: Vec<_> = svc
        .list_statuses(board_id, owner)
        .await
        .unwrap()
        .iter()
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(names, vec!["To Do", "In Progress", "Done"]);
}

#[tokio::test]
async fn sync_repairs_stale_completion_and_is_idempotent() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let done = status_id_by_name(&db, board_id, "Done").await;
    let repo = SurrealTaskRepository::new(db.clone());

    let stale = seed_task(&db, owner, board_id, todo).await;
    let missing = seed_task(&db, owner, board_id, done).await;

    // Corrupt both directions behind the engine's back.
    let mut t = repo.get_by_id(stale.id).await.unwrap();
    t.is_completed = true;
    t.completed_at = Some(chrono::Utc::now());
    repo.save(t).await.unwrap();
    let mut t = repo.get_by_id(missing.id).await.unwrap();
    t.completed_at = None;
    repo.save(t).await.unwrap();

    let report = boards(&db)
        .sync_task_completion(board_id, owner)
        .await
        .unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.updated, 2);
    assert_eq!(report.completed, 1);
    assert_eq!(report.uncompleted, 1);

    let second = boards(&db)
        .sync_task_completion(board_id, owner)
        .await
        .unwrap();
    assert_eq!(second.updated, 0);

    let repaired = repo.get_by_id(missing.id).await.unwrap();
    assert!(repaired.is_completed);
    assert!(repaired.completed_at.is_some());
}

// -- task engine --------------------------------------------------------

#[tokio::test]
async fn moving_between_statuses_re_derives_completion() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let done = status_id_by_name(&db, board_id, "Done").await;
    let svc = tasks(&db);

    let task = seed_task(&db, owner, board_id, todo).await;
    assert!(!task.is_completed);

    let completed = svc.move_task(owner, task.id, done, None).await.unwrap();
    assert!(completed.is_completed);
    let first_stamp = completed.completed_at.unwrap();

    let reopened = svc.move_task(owner, task.id, todo, Some(4)).await.unwrap();
    assert!(!reopened.is_completed);
    assert!(reopened.completed_at.is_none());
    assert_eq!(reopened.order_index, 4);

    let redone = svc.move_task(owner, task.id, done, None).await.unwrap();
    assert!(redone.completed_at.unwrap() >= first_stamp);
}

#[tokio::test]
async fn cross_board_move_fails_and_leaves_the_task_untouched() {
    let db = setup().await;
    let (owner, _, project_id, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;

    let other_board = boards(&db)
        .create_board(
            owner,
            CreateBoard {
                project_id,
                name: "Other".into(),
                description: None,
                view_type: None,
            },
        )
        .await
        .unwrap();
    let foreign_done = status_id_by_name(&db, other_board.id, "Done").await;

    let task = seed_task(&db, owner, board_id, todo).await;
    let err = tasks(&db)
        .move_task(owner, task.id, foreign_done, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::Validation { .. }));

    let unchanged = tasks(&db).get(task.id, owner).await.unwrap();
    assert_eq!(unchanged.status_id, todo);
    assert!(!unchanged.is_completed);
}

#[tokio::test]
async fn update_with_status_change_behaves_like_a_move() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let done = status_id_by_name(&db, board_id, "Done").await;
    let svc = tasks(&db);

    let task = seed_task(&db, owner, board_id, todo).await;
    let updated = svc
        .update(
            owner,
            task.id,
            UpdateTask {
                title: Some("Renamed".into()),
                status_id: Some(done),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert!(updated.is_completed);

    // A patch without status_id leaves completion alone.
    let retitled = svc
        .update(
            owner,
            task.id,
            UpdateTask {
                title: Some("Renamed again".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(retitled.is_completed);
    assert_eq!(retitled.completed_at, updated.completed_at);
}

#[tokio::test]
async fn task_created_into_a_final_status_is_completed() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let done = status_id_by_name(&db, board_id, "Done").await;

    let task = seed_task(&db, owner, board_id, done).await;
    assert!(task.is_completed);
    assert!(task.completed_at.is_some());
}

// -- access chain -------------------------------------------------------

#[tokio::test]
async fn unknown_ids_are_not_found_before_access_is_checked() {
    let db = setup().await;
    let (_, _, _, board_id) = seed_workspace(&db).await;
    let stranger = seed_user(&db, "stranger@example.com").await;

    // Unknown board: NotFound even for a non-member.
    let err = boards(&db)
        .get_board(Uuid::new_v4(), stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::NotFound { .. }));

    // Known board, no membership: AccessDenied.
    let err = boards(&db).get_board(board_id, stranger).await.unwrap_err();
    assert!(matches!(err, PlanhubError::AccessDenied { .. }));
}

#[tokio::test]
async fn role_floors_are_enforced_per_operation() {
    let db = setup().await;
    let (owner, org_id, project_id, board_id) = seed_workspace(&db).await;
    let orgs = organizations(&db);

    let viewer = seed_user(&db, "viewer@example.com").await;
    orgs.invite_member(org_id, owner, "viewer@example.com", "viewer")
        .await
        .unwrap();
    let member = seed_user(&db, "member@example.com").await;
    orgs.invite_member(org_id, owner, "member@example.com", "member")
        .await
        .unwrap();

    // Viewer: read yes, write no.
    boards(&db).get_board(board_id, viewer).await.unwrap();
    let err = projects(&db)
        .create(
            viewer,
            CreateProject {
                organization_id: org_id,
                name: "Nope".into(),
                description: None,
                color_theme: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::InsufficientPermissions { .. }));

    // Member: create yes, project delete no.
    let err = projects(&db).delete(project_id, member).await.unwrap_err();
    assert!(matches!(err, PlanhubError::InsufficientPermissions { .. }));

    // Member cannot grant elevated roles.
    seed_user(&db, "late@example.com").await;
    let err = orgs
        .invite_member(org_id, member, "late@example.com", "admin")
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::InsufficientPermissions { .. }));

    // Only the Owner can delete the organization.
    let err = orgs.delete(org_id, member).await.unwrap_err();
    assert!(matches!(err, PlanhubError::InsufficientPermissions { .. }));
    orgs.delete(org_id, owner).await.unwrap();
}

#[tokio::test]
async fn membership_lifecycle_guards() {
    let db = setup().await;
    let (owner, org_id, _, _) = seed_workspace(&db).await;
    let orgs = organizations(&db);

    // Duplicate invite.
    seed_user(&db, "dup@example.com").await;
    orgs.invite_member(org_id, owner, "dup@example.com", "member")
        .await
        .unwrap();
    let err = orgs
        .invite_member(org_id, owner, "dup@example.com", "member")
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::AlreadyExists { .. }));

    // Bad role string.
    seed_user(&db, "next@example.com").await;
    let err = orgs
        .invite_member(org_id, owner, "next@example.com", "superuser")
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::Validation { .. }));

    // The last owner can neither leave nor be demoted.
    let err = orgs.remove_member(org_id, owner, owner).await.unwrap_err();
    assert!(matches!(err, PlanhubError::BusinessLogic { .. }));
    let err = orgs
        .update_member_role(org_id, owner, owner, "admin")
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::BusinessLogic { .. }));

    // With a second owner the original can step down.
    seed_user(&db, "second@example.com").await;
    let second = orgs
        .invite_member(org_id, owner, "second@example.com", "owner")
        .await
        .unwrap();
    assert_eq!(second.role, OrganizationRole::Owner);
    orgs.remove_member(org_id, owner, owner).await.unwrap();
}

// -- task sub-resources -------------------------------------------------

#[tokio::test]
async fn comment_editing_is_author_only() {
    let db = setup().await;
    let (owner, org_id, _, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let svc = comments(&db);

    let other = seed_user(&db, "other@example.com").await;
    organizations(&db)
        .invite_member(org_id, owner, "other@example.com", "member")
        .await
        .unwrap();

    let task = seed_task(&db, owner, board_id, todo).await;
    let comment = svc
        .create(owner, task.id, "First pass".into())
        .await
        .unwrap();
    assert!(!comment.is_edited);

    let err = svc
        .edit(other, task.id, comment.id, "Hijacked".into())
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::AccessDenied { .. }));

    let edited = svc
        .edit(owner, task.id, comment.id, "Second pass".into())
        .await
        .unwrap();
    assert!(edited.is_edited);
    assert_eq!(edited.content, "Second pass");

    // A non-admin member cannot delete someone else's comment.
    let err = svc.delete(other, task.id, comment.id).await.unwrap_err();
    assert!(matches!(err, PlanhubError::InsufficientPermissions { .. }));
    svc.delete(owner, task.id, comment.id).await.unwrap();
}

#[tokio::test]
async fn checklist_completion_does_not_touch_the_task() {
    let db = setup().await;
    let (owner, _, _, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let svc = checklists(&db);

    let task = seed_task(&db, owner, board_id, todo).await;
    let item = svc
        .create(
            owner,
            planhub_core::models::checklist::CreateChecklist {
                task_id: task.id,
                title: "Step 1".into(),
                order_index: None,
            },
        )
        .await
        .unwrap();

    let completed = svc
        .update(
            owner,
            task.id,
            item.id,
            planhub_core::models::checklist::UpdateChecklist {
                is_completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(completed.is_completed);
    assert!(completed.completed_at.is_some());

    let owning_task = tasks(&db).get(task.id, owner).await.unwrap();
    assert!(!owning_task.is_completed);
}

#[tokio::test]
async fn tags_are_scoped_to_the_tasks_project() {
    let db = setup().await;
    let (owner, org_id, project_id, board_id) = seed_workspace(&db).await;
    let todo = status_id_by_name(&db, board_id, "To Do").await;
    let task_svc = tasks(&db);
    let project_svc = projects(&db);

    let task = seed_task(&db, owner, board_id, todo).await;
    let tag = project_svc
        .create_tag(
            owner,
            planhub_core::models::tag::CreateTag {
                project_id,
                name: "backend".into(),
                color: None,
            },
        )
        .await
        .unwrap();

    task_svc.attach_tag(owner, task.id, tag.id).await.unwrap();
    task_svc.attach_tag(owner, task.id, tag.id).await.unwrap();
    assert_eq!(task_svc.list_tags(owner, task.id).await.unwrap().len(), 1);

    // A tag from another project cannot be attached.
    let other_project = project_svc
        .create(
            owner,
            CreateProject {
                organization_id: org_id,
                name: "Mobile".into(),
                description: None,
                color_theme: None,
            },
        )
        .await
        .unwrap();
    let foreign = project_svc
        .create_tag(
            owner,
            planhub_core::models::tag::CreateTag {
                project_id: other_project.id,
                name: "ios".into(),
                color: None,
            },
        )
        .await
        .unwrap();
    let err = task_svc
        .attach_tag(owner, task.id, foreign.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanhubError::Validation { .. }));

    task_svc.detach_tag(owner, task.id, tag.id).await.unwrap();
    assert!(task_svc.list_tags(owner, task.id).await.unwrap().is_empty());
}
