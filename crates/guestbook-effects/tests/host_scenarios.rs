//! End-to-end guestbook scenarios against a running host.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use assert_matches::assert_matches;
use guestbook_core::{Entry, GuestbookConfig, GuestbookError, GuestbookEvent, SignerAddress};
use guestbook_effects::{
    FilesystemStorageHandler, GuestbookClient, GuestbookHost, MemoryStorageHandler,
    SimulatedTimeHandler,
};
use std::collections::BTreeSet;
use std::sync::Arc;

const A: SignerAddress = SignerAddress::repeat(0x0a);
const B: SignerAddress = SignerAddress::repeat(0x0b);

async fn memory_host(start: u64) -> (GuestbookHost, SimulatedTimeHandler) {
    let clock = SimulatedTimeHandler::new(start);
    let host = GuestbookHost::open(
        &GuestbookConfig::default(),
        clock.clone(),
        MemoryStorageHandler::new(),
    )
    .await
    .unwrap();
    (host, clock)
}

fn messages(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(Entry::message).collect()
}

#[tokio::test]
async fn first_signature_is_readable() {
    let (host, _) = memory_host(1_700_000_000).await;
    host.sign_book(A, "Hello, Base!").await.unwrap();

    assert_eq!(host.total_signatures().await, 1);
    let last = host.last_signatures(1).await;
    assert_eq!(last[0].signer(), A);
    assert_eq!(last[0].message(), "Hello, Base!");
}

#[tokio::test]
async fn newest_first_ordering() {
    let (host, clock) = memory_host(100).await;
    for message in ["First", "Second", "Third"] {
        host.sign_book(A, message).await.unwrap();
        clock.advance_secs(1);
    }

    assert_eq!(
        messages(&host.last_signatures(3).await),
        vec!["Third", "Second", "First"]
    );
}

#[tokio::test]
async fn window_of_three_out_of_five() {
    let (host, _) = memory_host(100).await;
    for message in ["One", "Two", "Three", "Four", "Five"] {
        host.sign_book(B, message).await.unwrap();
    }

    let last = host.last_signatures(3).await;
    assert_eq!(last.len(), 3);
    assert_eq!(last[0].message(), "Five");
}

#[tokio::test]
async fn over_request_returns_all() {
    let (host, _) = memory_host(100).await;
    host.sign_book(A, "One").await.unwrap();
    host.sign_book(B, "Two").await.unwrap();

    assert_eq!(host.last_signatures(100).await.len(), 2);
    assert!(host.last_signatures(0).await.is_empty());
}

#[tokio::test]
async fn empty_message_never_counts() {
    let (host, _) = memory_host(100).await;
    host.sign_book(A, "ok").await.unwrap();

    let err = host.sign_book(A, "").await.unwrap_err();
    assert_eq!(err, GuestbookError::validation("Message cannot be empty"));
    assert_eq!(host.total_signatures().await, 1);
}

#[tokio::test]
async fn reads_are_stable_without_writes() {
    let (host, _) = memory_host(100).await;
    for i in 0..4 {
        host.sign_book(A, format!("m{i}")).await.unwrap();
    }

    let first = host.last_signatures(3).await;
    let second = host.last_signatures(3).await;
    assert_eq!(first, second);
    assert_eq!(host.total_signatures().await, host.total_signatures().await);
}

#[tokio::test]
async fn timestamps_follow_host_clock_and_never_rewind() {
    let (host, clock) = memory_host(1_000).await;
    host.sign_book(A, "at 1000").await.unwrap();

    clock.set_time(900);
    let receipt = host.sign_book(A, "clock went back").await.unwrap();
    assert_eq!(receipt.entry.timestamp(), 1_000);

    clock.set_time(1_500);
    let receipt = host.sign_book(A, "later").await.unwrap();
    assert_eq!(receipt.entry.timestamp(), 1_500);
}

#[tokio::test]
async fn subscribers_see_new_signature() {
    let (host, _) = memory_host(42).await;
    let mut events = host.subscribe();

    host.sign_book(B, "Test message").await.unwrap();

    assert_matches!(
        events.recv().await.unwrap(),
        GuestbookEvent::NewSignature { index: 0, signer, ref message, timestamp }
            if signer == B && message == "Test message" && timestamp == 42
    );
}

#[tokio::test]
async fn ledger_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let clock = SimulatedTimeHandler::new(10);

    let host = GuestbookHost::open(
        &GuestbookConfig::default(),
        clock.clone(),
        FilesystemStorageHandler::new(dir.path()).unwrap(),
    )
    .await
    .unwrap();
    assert!(host.was_deployed());
    host.sign_book(A, "persisted one").await.unwrap();
    host.sign_book(B, "persisted two").await.unwrap();
    let before = host.last_signatures(10).await;
    host.shutdown().await.unwrap();

    let reopened = GuestbookHost::open(
        &GuestbookConfig::default(),
        clock,
        FilesystemStorageHandler::new(dir.path()).unwrap(),
    )
    .await
    .unwrap();
    assert!(!reopened.was_deployed());
    assert_eq!(reopened.last_signatures(10).await, before);

    let receipt = reopened.sign_book(A, "after restart").await.unwrap();
    assert_eq!(receipt.index, 2);
}

#[tokio::test]
async fn second_host_on_same_directory_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let clock = SimulatedTimeHandler::new(10);
    let config = GuestbookConfig::default();
    let open_on_dir = || {
        GuestbookHost::open(
            &config,
            clock.clone(),
            FilesystemStorageHandler::new(dir.path()).unwrap(),
        )
    };

    let first = open_on_dir().await.unwrap();
    first.sign_book(A, "from the first host").await.unwrap();

    assert_matches!(
        open_on_dir().await,
        Err(GuestbookError::TransientUnavailable { .. })
    );

    first.sign_book(B, "still the only writer").await.unwrap();
    first.shutdown().await.unwrap();

    let second = open_on_dir().await.unwrap();
    second.sign_book(A, "after handover").await.unwrap();
    assert_eq!(
        messages(&second.last_signatures(10).await),
        vec!["after handover", "still the only writer", "from the first host"]
    );
}

#[tokio::test]
async fn corrupted_snapshot_refuses_to_open() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("guestbook_ledger.dat"), b"{not json").unwrap();

    let result = GuestbookHost::open(
        &GuestbookConfig::default(),
        SimulatedTimeHandler::new(0),
        FilesystemStorageHandler::new(dir.path()).unwrap(),
    )
    .await;
    assert_matches!(result, Err(GuestbookError::Corrupted { .. }));
}

#[tokio::test]
async fn unreachable_storage_is_transient() {
    let storage = MemoryStorageHandler::new();
    storage.set_available(false);

    let result = GuestbookHost::open(
        &GuestbookConfig::default(),
        SimulatedTimeHandler::new(0),
        storage,
    )
    .await;
    assert_matches!(result, Err(GuestbookError::TransientUnavailable { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signers_commit_exactly_once() {
    let (host, _) = memory_host(500).await;
    let host = Arc::new(host);

    let mut tasks = Vec::new();
    for signer in 0..8u8 {
        let host = Arc::clone(&host);
        tasks.push(tokio::spawn(async move {
            let mut indices = Vec::new();
            for n in 0..5 {
                let receipt = host
                    .sign_book(SignerAddress::repeat(signer), format!("{signer}-{n}"))
                    .await
                    .unwrap();
                indices.push(receipt.index);
            }
            indices
        }));
    }

    let mut all = BTreeSet::new();
    for task in tasks {
        for index in task.await.unwrap() {
            assert!(all.insert(index), "index {index} committed twice");
        }
    }

    assert_eq!(all, (0..40).collect::<BTreeSet<_>>());
    assert_eq!(host.total_signatures().await, 40);
}

#[tokio::test]
async fn client_reads_default_wall() {
    let (host, _) = memory_host(0).await;
    let client = GuestbookClient::new(
        host,
        SimulatedTimeHandler::new(0),
        guestbook_core::ClientConfig::default(),
    );
    for i in 0..25 {
        client.sign(A, format!("entry {i}")).await.unwrap();
    }

    let wall = client.wall().await.unwrap();
    assert_eq!(wall.len(), 20);
    assert_eq!(wall[0].message(), "entry 24");
    assert_eq!(client.total_signatures().await.unwrap(), 25);
}
