use springmemo_core::codec;
use springmemo_core::{
    AutosaveConfig, ChannelNoteHost, CloseOutcome, DeskError, HostNotification, LocalMemoService,
    MemoDesk, MemoKind, MemoService, MemoServiceError,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Duration;
use uuid::Uuid;

fn desk_with(
    service: &Arc<LocalMemoService>,
) -> (MemoDesk, UnboundedReceiver<HostNotification>) {
    let (host, events) = ChannelNoteHost::new();
    let desk = MemoDesk::new(
        service.clone(),
        Arc::new(host),
        AutosaveConfig::with_quiet_period(Duration::from_millis(50)),
    );
    (desk, events)
}

#[tokio::test(start_paused = true)]
async fn load_opens_sessions_only_for_visible_memos() {
    let service = Arc::new(LocalMemoService::in_memory().unwrap());
    let visible = service.create(MemoKind::Normal, "visible").await.unwrap();
    let hidden = service.create(MemoKind::Todo, "hidden").await.unwrap();
    let mut page = hidden.page();
    page.is_open = false;
    service.update(hidden.id, &page).await.unwrap();

    let (mut desk, _events) = desk_with(&service);
    let memos = desk.load().await.unwrap();

    assert_eq!(memos.len(), 2);
    assert_eq!(desk.open_session_ids(), vec![visible.id]);
    assert!(desk.session(hidden.id).is_none());
}

#[tokio::test(start_paused = true)]
async fn create_memo_rejects_empty_title_before_calling_service() {
    let service = Arc::new(LocalMemoService::in_memory().unwrap());
    let (mut desk, _events) = desk_with(&service);

    let err = desk.create_memo(MemoKind::Normal, "").await.unwrap_err();
    assert!(matches!(
        err,
        DeskError::Service(MemoServiceError::InvalidTitle(_))
    ));
    assert!(service.list().await.unwrap().is_empty());
    assert!(desk.open_session_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn quit_flushes_pending_edits_of_every_session() {
    let service = Arc::new(LocalMemoService::in_memory().unwrap());
    let (mut desk, _events) = desk_with(&service);

    let first = desk.create_memo(MemoKind::Normal, "first").await.unwrap();
    let second = desk.create_memo(MemoKind::Todo, "second").await.unwrap();
    first.edit_text("alpha").unwrap();
    second.edit_text("beta\ngamma").unwrap();

    let mut outcomes = desk.quit().await;
    outcomes.sort_by_key(|(id, _)| *id);
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes
        .iter()
        .all(|(_, outcome)| *outcome == CloseOutcome::Saved));
    assert!(desk.open_session_ids().is_empty());

    let first_saved = service.get(first.memo_id()).await.unwrap().unwrap();
    let second_saved = service.get(second.memo_id()).await.unwrap().unwrap();
    assert_eq!(codec::decode(&first_saved.source), "alpha");
    assert_eq!(codec::decode(&second_saved.source), "beta\ngamma");
}

#[tokio::test(start_paused = true)]
async fn open_memo_reuses_a_live_session() {
    let service = Arc::new(LocalMemoService::in_memory().unwrap());
    let memo = service.create(MemoKind::Normal, "shared").await.unwrap();
    let (mut desk, _events) = desk_with(&service);

    let first = desk.open_memo(memo.clone());
    let second = desk.open_memo(memo);
    first.edit_text("typed in one window").unwrap();

    let snapshot = second.snapshot().await.unwrap();
    assert_eq!(snapshot.pending_text, "typed in one window");
    assert_eq!(desk.open_session_ids().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn close_memo_keeps_the_memo_and_unknown_ids_fail() {
    let service = Arc::new(LocalMemoService::in_memory().unwrap());
    let (mut desk, _events) = desk_with(&service);
    let handle = desk.create_memo(MemoKind::Normal, "closing").await.unwrap();
    let id = handle.memo_id();

    assert_eq!(desk.close_memo(id).await.unwrap(), CloseOutcome::Saved);
    assert!(desk.session(id).is_none());
    assert!(service.get(id).await.unwrap().is_some());

    let missing = Uuid::new_v4();
    assert!(matches!(
        desk.close_memo(missing).await,
        Err(DeskError::NoSession(id)) if id == missing
    ));
}

#[tokio::test(start_paused = true)]
async fn delete_memo_ends_session_and_removes_memo() {
    let service = Arc::new(LocalMemoService::in_memory().unwrap());
    let (mut desk, mut events) = desk_with(&service);
    let handle = desk.create_memo(MemoKind::Schedule, "doomed").await.unwrap();
    let id = handle.memo_id();
    handle.edit_text("draft").unwrap();

    desk.delete_memo(id).await.unwrap();

    assert!(handle.snapshot().await.is_err());
    assert!(desk.session(id).is_none());
    assert!(service.get(id).await.unwrap().is_none());

    let mut closed = false;
    while let Ok(event) = events.try_recv() {
        if let HostNotification::Closed { memo_id, .. } = event {
            closed |= memo_id == id;
        }
    }
    assert!(closed);
}

#[tokio::test(start_paused = true)]
async fn new_memo_dialog_is_single_instance() {
    let service = Arc::new(LocalMemoService::in_memory().unwrap());
    let (desk, _events) = desk_with(&service);

    let dialog = desk.begin_new_memo().expect("first dialog opens");
    assert!(desk.begin_new_memo().is_none());
    drop(dialog);
    assert!(desk.begin_new_memo().is_some());
}
