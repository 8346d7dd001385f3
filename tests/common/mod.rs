//
//  bitbucket-insights
//  tests/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use git2::{Commit, Oid, Repository, Signature, Time};
use serde_json::{json, Value};

use bitbucket_insights::api::{BitbucketClient, RetryPolicy, Sleeper};
use bitbucket_insights::config::BitbucketConfig;

pub const USERNAME: &str = "jdoe";
pub const TOKEN: &str = "s3cret";
pub const PR_PATH: &str = "/rest/api/1.0/projects/PROJ/repos/app/pull-requests";

/// Records every requested sleep instead of waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// A client for `url` whose sleeps are recorded.
pub fn client_for(url: &str) -> (BitbucketClient, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let config = BitbucketConfig::new(url, USERNAME, TOKEN);
    let client = BitbucketClient::new(&config, RetryPolicy::default())
        .unwrap()
        .with_sleeper(sleeper.clone());
    (client, sleeper)
}

/// One page of a paginated response.
pub fn page(values: Vec<Value>, start: u32, next: Option<u32>) -> String {
    let mut body = json!({
        "size": values.len(),
        "limit": 100,
        "start": start,
        "isLastPage": next.is_none(),
        "values": values,
    });
    if let Some(next) = next {
        body["nextPageStart"] = json!(next);
    }
    body.to_string()
}

pub fn pr_json(id: u64, state: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Change {}", id),
        "state": state,
        "createdDate": 1_700_000_000_000i64 + id as i64,
        "updatedDate": 1_700_000_100_000i64,
        "closedDate": if state == "OPEN" { Value::Null } else { json!(1_700_000_200_000i64) },
        "fromRef": {"id": format!("refs/heads/feature/{}", id), "displayId": format!("feature/{}", id)},
        "toRef": {"id": "refs/heads/master", "displayId": "master"},
        "author": {"user": {"name": "jdoe", "displayName": "Jane Doe"}, "role": "AUTHOR"}
    })
}

pub fn activity_json(id: u64, action: &str, user: &str) -> Value {
    json!({
        "id": id,
        "createdDate": 1_700_000_050_000i64 + id as i64,
        "user": {"name": user, "displayName": user.to_uppercase()},
        "action": action
    })
}

pub fn commit_json(hash: &str) -> Value {
    json!({"id": hash, "displayId": &hash[..7.min(hash.len())], "message": "change"})
}

fn commit(repo: &Repository, parents: &[Oid], file: &str, content: &str, message: &str, time: i64) -> Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(file), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let parents: Vec<Commit<'_>> = parents.iter().map(|oid| repo.find_commit(*oid).unwrap()).collect();
    let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();
    let sig = Signature::new("Jane Doe", "jane@example.com", &Time::new(time, 0)).unwrap();

    repo.commit(None, &sig, &sig, message, &tree, &parent_refs).unwrap()
}

/// Creates a clone-like repository at `path` with one merged pull request
/// (#7, two commits) and an `origin` remote on `origin_url`.
pub fn merged_repository(path: &Path, origin_url: &str) -> Repository {
    let repo = Repository::init(path).unwrap();
    let t0 = 1_700_000_000;

    let c1 = commit(&repo, &[], "README.md", "hello\n", "Initial commit", t0);
    let f1 = commit(&repo, &[c1], "a.txt", "a\n", "Add a", t0 + 10);
    let f2 = commit(&repo, &[f1], "b.txt", "b\n", "Add b", t0 + 20);
    let m = commit(
        &repo,
        &[c1, f2],
        "README.md",
        "hello\n",
        "Merge pull request #7 in PROJ/app from feature/ab to master",
        t0 + 30,
    );

    repo.reference("refs/heads/master", m, true, "fixture").unwrap();
    repo.set_head("refs/heads/master").unwrap();
    repo.remote("origin", origin_url).unwrap();
    repo
}
