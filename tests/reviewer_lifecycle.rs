//! End-to-end reviewer lifecycle tests against a real SQLite file.
//!
//! Covers the cross-service behaviour: owning-team freezing, the team
//! deactivation cascade, reassignment exclusion and merge idempotence,
//! plus parallel writers on a multi-threaded runtime.

use std::collections::HashSet;
use std::sync::Arc;

use review_roster::api::AppState;
use review_roster::db;
use review_roster::error::AppError;
use review_roster::models::{PrStatus, PullRequest, TeamMember};
use review_roster::services::{ReviewerSelector, SeededRandom};
use tempfile::{tempdir, TempDir};

async fn setup(seed: u64) -> (TempDir, AppState) {
    let dir = tempdir().unwrap();
    let pool = db::initialize(&dir.path().join("roster.db")).await.unwrap();
    let state = AppState::new(pool, ReviewerSelector::new(Arc::new(SeededRandom::new(seed))));
    (dir, state)
}

fn members(ids: &[&str]) -> Vec<TeamMember> {
    ids.iter()
        .map(|id| TeamMember {
            user_id: id.to_string(),
            username: format!("user {}", id),
            is_active: true,
        })
        .collect()
}

fn assert_reviewers_valid(pr: &PullRequest) {
    let unique: HashSet<_> = pr.assigned_reviewers.iter().collect();
    assert_eq!(unique.len(), pr.assigned_reviewers.len(), "duplicate reviewer on {}", pr.pull_request_id);
    assert!(!pr.has_reviewer(&pr.author_id), "author reviews own {}", pr.pull_request_id);
    assert!(pr.assigned_reviewers.len() <= 2);
}

#[tokio::test]
async fn test_team_of_three_gets_both_teammates() {
    let (_dir, state) = setup(1).await;
    state.teams.create_team("A", members(&["u1", "u2", "u3"])).await.unwrap();

    let pr = state.pull_requests.create_pull_request("p1", "x", "u1").await.unwrap();

    assert_eq!(pr.assigned_reviewers, vec!["u2", "u3"]);
    assert_eq!(pr.team_name, "A");
    assert_eq!(pr.status, PrStatus::Open);
}

#[tokio::test]
async fn test_reassign_with_exhausted_pool_fails() {
    let (_dir, state) = setup(1).await;
    state.teams.create_team("A", members(&["u1", "u2", "u3"])).await.unwrap();
    state.pull_requests.create_pull_request("p1", "x", "u1").await.unwrap();

    let err = state.pull_requests.reassign_reviewer("p1", "u2").await.unwrap_err();
    assert!(matches!(err, AppError::NoCandidate { .. }));

    let pr = state.pull_requests.get_pull_request("p1").await.unwrap();
    assert_eq!(pr.assigned_reviewers, vec!["u2", "u3"]);
}

#[tokio::test]
async fn test_reassign_never_returns_excluded_users() {
    for seed in 0..10 {
        let (_dir, state) = setup(seed).await;
        state
            .teams
            .create_team("A", members(&["u1", "u2", "u3", "u4", "u5", "u6"]))
            .await
            .unwrap();
        let before = state.pull_requests.create_pull_request("p1", "x", "u1").await.unwrap();
        let old = before.assigned_reviewers[0].clone();

        let (after, new_reviewer) = state.pull_requests.reassign_reviewer("p1", &old).await.unwrap();

        assert_ne!(new_reviewer, "u1");
        assert!(!before.has_reviewer(&new_reviewer));
        assert!(after.has_reviewer(&new_reviewer));
        assert!(!after.has_reviewer(&old));
        assert_reviewers_valid(&after);
    }
}

#[tokio::test]
async fn test_replenishment_uses_owning_team_not_author_team() {
    let (_dir, state) = setup(3).await;
    state.teams.create_team("B", members(&["author", "b2", "b3", "b4"])).await.unwrap();
    let pr = state.pull_requests.create_pull_request("p2", "x", "author").await.unwrap();
    assert_eq!(pr.team_name, "B");

    // The author and one reviewer move to team C, which also has an outsider.
    let moved = pr.assigned_reviewers[0].clone();
    let mut c_members = members(&["author", "c1"]);
    c_members.extend(members(&[moved.as_str()]));
    state.teams.create_team("C", c_members).await.unwrap();

    state.teams.deactivate_team("C").await.unwrap();

    let pr = state.pull_requests.get_pull_request("p2").await.unwrap();
    assert_eq!(pr.team_name, "B");
    assert_eq!(pr.assigned_reviewers.len(), 2);
    assert!(!pr.has_reviewer(&moved));
    assert!(!pr.has_reviewer("c1"));
    let b_team: HashSet<&str> = ["b2", "b3", "b4"].into_iter().collect();
    assert!(pr.assigned_reviewers.iter().all(|r| b_team.contains(r.as_str())));
    assert_reviewers_valid(&pr);
}

#[tokio::test]
async fn test_deactivation_cascade() {
    let (_dir, state) = setup(9).await;
    state.teams.create_team("A", members(&["a1", "a2", "a3", "a4"])).await.unwrap();
    for (id, author) in [("p1", "a1"), ("p2", "a2"), ("p3", "a3")] {
        state.pull_requests.create_pull_request(id, "x", author).await.unwrap();
    }
    state.pull_requests.merge_pull_request("p3").await.unwrap();
    let merged_before = state.pull_requests.get_pull_request("p3").await.unwrap();

    state.teams.create_team("C", members(&["a2", "a3"])).await.unwrap();
    state.teams.deactivate_team("C").await.unwrap();

    let team_c = state.teams.get_team("C").await.unwrap();
    assert!(team_c.members.iter().all(|m| !m.is_active));

    for id in ["p1", "p2"] {
        let pr = state.pull_requests.get_pull_request(id).await.unwrap();
        assert!(!pr.has_reviewer("a2"), "{} kept a2", id);
        assert!(!pr.has_reviewer("a3"), "{} kept a3", id);
        assert_reviewers_valid(&pr);
    }

    // p2's author left A; both remaining A members are eligible.
    let p2 = state.pull_requests.get_pull_request("p2").await.unwrap();
    assert_eq!(p2.assigned_reviewers, vec!["a1", "a4"]);

    // Merged pull requests are frozen.
    let merged_after = state.pull_requests.get_pull_request("p3").await.unwrap();
    assert_eq!(merged_after.assigned_reviewers, merged_before.assigned_reviewers);
}

#[tokio::test]
async fn test_merge_twice_and_reassign_after_merge() {
    let (_dir, state) = setup(4).await;
    state.teams.create_team("A", members(&["u1", "u2", "u3", "u4"])).await.unwrap();
    let pr = state.pull_requests.create_pull_request("p1", "x", "u1").await.unwrap();

    let first = state.pull_requests.merge_pull_request("p1").await.unwrap();
    let second = state.pull_requests.merge_pull_request("p1").await.unwrap();
    assert_eq!(first.merged_at, second.merged_at);
    assert_eq!(second.status, PrStatus::Merged);

    let err = state
        .pull_requests
        .reassign_reviewer("p1", &pr.assigned_reviewers[0])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_reviews_follow_assignment_and_merge() {
    let (_dir, state) = setup(2).await;
    state.teams.create_team("A", members(&["u1", "u2"])).await.unwrap();
    state.pull_requests.create_pull_request("p1", "first", "u1").await.unwrap();
    state.pull_requests.create_pull_request("p2", "second", "u1").await.unwrap();

    let reviews = state.users.get_reviews("u2").await.unwrap();
    assert_eq!(reviews.len(), 2);

    state.pull_requests.merge_pull_request("p1").await.unwrap();
    let reviews = state.users.get_reviews("u2").await.unwrap();
    let ids: Vec<&str> = reviews.iter().map(|r| r.pull_request_id.as_str()).collect();
    assert_eq!(ids, vec!["p2"]);
}

#[tokio::test]
async fn test_inactive_user_is_not_selected() {
    let (_dir, state) = setup(6).await;
    state.teams.create_team("A", members(&["u1", "u2", "u3", "u4"])).await.unwrap();
    state.users.set_is_active("u3", false).await.unwrap();

    for i in 0..5 {
        let pr = state
            .pull_requests
            .create_pull_request(&format!("p{}", i), "x", "u1")
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["u2", "u4"]);
    }
}

const PARALLEL_TEAMS: usize = 16;

async fn seed_parallel_teams(state: &AppState) {
    for t in 0..PARALLEL_TEAMS {
        let ids: Vec<String> = ["a", "b", "c", "d"].iter().map(|m| format!("{}{}", m, t)).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        state.teams.create_team(&format!("T{}", t), members(&ids)).await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_creates_and_reassignments_all_succeed() {
    let (_dir, state) = setup(7).await;
    seed_parallel_teams(&state).await;

    let mut handles = Vec::new();
    for t in 0..PARALLEL_TEAMS {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            state
                .pull_requests
                .create_pull_request(&format!("p{}", t), "x", &format!("a{}", t))
                .await
        }));
    }
    let mut created = Vec::new();
    for handle in handles {
        created.push(handle.await.unwrap().unwrap());
    }

    let mut handles = Vec::new();
    for pr in created {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let old = pr.assigned_reviewers[0].clone();
            let result = state.pull_requests.reassign_reviewer(&pr.pull_request_id, &old).await;
            (pr, old, result)
        }));
    }

    for handle in handles {
        let (before, old, result) = handle.await.unwrap();
        let (after, new_reviewer) = result.unwrap();

        assert!(!after.has_reviewer(&old));
        assert!(!before.has_reviewer(&new_reviewer));
        assert_eq!(after.assigned_reviewers.len(), 2);
        assert_reviewers_valid(&after);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_team_deactivations_all_succeed() {
    let (_dir, state) = setup(8).await;
    seed_parallel_teams(&state).await;
    for t in 0..PARALLEL_TEAMS {
        state
            .pull_requests
            .create_pull_request(&format!("p{}", t), "x", &format!("a{}", t))
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for t in 0..PARALLEL_TEAMS {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            state.teams.deactivate_team(&format!("T{}", t)).await
        }));
    }

    for handle in handles {
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.users_deactivated, 4);
        assert_eq!(summary.reviewers_removed, 2);
    }

    for t in 0..PARALLEL_TEAMS {
        let team = state.teams.get_team(&format!("T{}", t)).await.unwrap();
        assert!(team.members.iter().all(|m| !m.is_active));
        let pr = state.pull_requests.get_pull_request(&format!("p{}", t)).await.unwrap();
        assert!(pr.assigned_reviewers.is_empty());
    }
}
