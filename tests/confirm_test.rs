//! Concurrent confirmation prompts on the tokio scheduler

use agent_console::config::ConfirmerConfig;
use agent_console::confirm::{ConfirmOptions, Confirmer};
use agent_console::error::ConfirmError;
use agent_console::queue::Phase;
use agent_console::timer::TokioScheduler;
use std::sync::Arc;
use std::time::Duration;

fn confirmer() -> Confirmer {
    let scheduler = TokioScheduler::current().unwrap();
    Confirmer::new(ConfirmerConfig::default(), Arc::new(scheduler))
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_concurrent_prompts_resolve_independently() {
    let confirmer = confirmer();

    let mut callers = Vec::new();
    for i in 0..5 {
        let pending = confirmer
            .confirm(ConfirmOptions::new(format!("Excluir item {}?", i)))
            .unwrap();
        callers.push(tokio::spawn(pending));
    }
    settle().await;

    let prompts = confirmer.snapshot();
    assert_eq!(prompts.len(), 5);
    assert_eq!(prompts[0].message, "Excluir item 0?");
    assert_eq!(prompts[4].message, "Excluir item 4?");

    // Answer in reverse order, alternating yes and no
    for (i, prompt) in prompts.iter().enumerate().rev() {
        assert!(confirmer.respond(prompt.id, i % 2 == 0));
    }
    settle().await;

    for (i, caller) in callers.into_iter().enumerate() {
        assert_eq!(caller.await.unwrap(), Ok(i % 2 == 0));
    }

    assert!(confirmer.snapshot().iter().all(|p| p.phase == Phase::Leaving));
    tokio::time::advance(Duration::from_millis(299)).await;
    settle().await;
    assert_eq!(confirmer.len(), 5);

    tokio::time::advance(Duration::from_millis(1)).await;
    settle().await;
    assert!(confirmer.is_empty());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_second_answer_is_ignored() {
    let confirmer = confirmer();
    let pending = confirmer
        .confirm(ConfirmOptions::new("Sair?").with_labels("Sim", "Não"))
        .unwrap();
    let id = pending.id();

    let prompts = confirmer.snapshot();
    let prompt = &prompts[0];
    assert_eq!(prompt.confirm_label, "Sim");
    assert_eq!(prompt.cancel_label, "Não");

    assert!(confirmer.accept(id));
    assert!(!confirmer.reject(id));
    assert!(!confirmer.dismiss(id));
    assert_eq!(pending.await, Ok(true));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_shutdown_abandons_waiting_callers() {
    let confirmer = confirmer();
    let waiting = tokio::spawn(
        confirmer
            .confirm(ConfirmOptions::new("Descartar alterações?"))
            .unwrap(),
    );
    settle().await;

    confirmer.shutdown();

    assert_eq!(waiting.await.unwrap(), Err(ConfirmError::Abandoned));
    assert!(!confirmer.is_active());
    assert_eq!(
        confirmer.confirm(ConfirmOptions::new("Outra?")).err(),
        Some(ConfirmError::Inactive)
    );
}
