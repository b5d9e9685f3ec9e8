//! 测试辅助：内存版存储库和应用状态。

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::cache::memory::MemoryStore;
use crate::config::Config;
use crate::database::{FollowRepository, LikeRepository, TweetRepository, UserRepository};
use crate::infrastructure::LocalFileRepository;
use crate::models::{Tweet, TweetWithUser, TweetsList, User, UsersList};
use crate::utils::pagination::PaginationQuery;
use crate::{AppState, Repositories};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    follows: HashSet<(Uuid, Uuid)>,
    tweets: BTreeMap<i64, Tweet>,
    replys: HashSet<(i64, i64)>,
    likes: HashSet<(Uuid, i64)>,
    next_tweet_id: i64,
}

impl Inner {
    fn user_view(&self, viewer_id: Uuid, user: &User) -> User {
        let mut view = user.clone();
        view.followers = Some(self.follows.iter().filter(|(_, b)| *b == user.user_id).count() as i64);
        view.following = Some(self.follows.iter().filter(|(a, _)| *a == user.user_id).count() as i64);
        view.is_following = Some(self.follows.contains(&(viewer_id, user.user_id)));
        view
    }

    fn users_page(&self, viewer_id: Uuid, ids: impl Iterator<Item = Uuid>, pq: &PaginationQuery) -> UsersList {
        let mut users: Vec<User> = ids
            .filter_map(|id| self.users.get(&id))
            .map(|u| {
                let mut view = self.user_view(viewer_id, u);
                view.sanitize_password();
                view
            })
            .collect();
        users.sort_by(|a, b| (&a.name, &a.user_name).cmp(&(&b.name, &b.user_name)));

        UsersList {
            info: pq.page_info(users.len() as i64),
            users: users
                .into_iter()
                .skip(usize::try_from(pq.offset()).unwrap_or(usize::MAX))
                .take(pq.limit() as usize)
                .collect(),
        }
    }

    fn tweet_view(&self, viewer_id: Uuid, tweet: &Tweet) -> Option<TweetWithUser> {
        let author = self.users.get(&tweet.user_id)?;
        Some(TweetWithUser {
            id: tweet.id,
            text: tweet.text.clone(),
            image: tweet.image.clone(),
            created_at: tweet.created_at,
            user_id: author.user_id,
            user_name: author.user_name.clone(),
            name: author.name.clone(),
            about: author.about.clone(),
            avatar: author.avatar.clone(),
            likes: self.likes.iter().filter(|(_, t)| *t == tweet.id).count() as i64,
            replys: self.replys.iter().filter(|(t, _)| *t == tweet.id).count() as i64,
            already_liked: self.likes.contains(&(viewer_id, tweet.id)),
        })
    }

    fn tweets_page(&self, viewer_id: Uuid, ids: impl Iterator<Item = i64>, pq: &PaginationQuery) -> TweetsList {
        let mut tweets: Vec<TweetWithUser> = ids
            .filter_map(|id| self.tweets.get(&id))
            .filter_map(|t| self.tweet_view(viewer_id, t))
            .collect();
        tweets.sort_by(|a, b| b.id.cmp(&a.id));

        TweetsList {
            info: pq.page_info(tweets.len() as i64),
            tweets: tweets
                .into_iter()
                .skip(usize::try_from(pq.offset()).unwrap_or(usize::MAX))
                .take(pq.limit() as usize)
                .collect(),
        }
    }
}

fn merge(target: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value.as_ref().filter(|v| !v.is_empty()) {
        *target = Some(v.clone());
    }
}

fn duplicate(what: &str) -> sqlx::Error {
    sqlx::Error::Protocol(format!("duplicate {what}"))
}

/// 内存数据库，实现全部存储库 trait
#[derive(Default)]
pub struct MemoryDb {
    inner: Mutex<Inner>,
    get_by_id_calls: AtomicUsize,
    fail_reply_link: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user_name: &str, name: &str) -> Uuid {
        let now = Utc::now();
        let user = User {
            user_id: Uuid::new_v4(),
            user_name: user_name.to_string(),
            name: name.to_string(),
            email: format!("{user_name}@example.com"),
            password: "not-a-real-hash".to_string(),
            role: Some("user".to_string()),
            created_at: now,
            updated_at: now,
            login_date: now,
            ..Default::default()
        };
        let id = user.user_id;
        self.inner.lock().unwrap().users.insert(id, user);
        id
    }

    pub fn add_follow(&self, follower_id: Uuid, following_id: Uuid) {
        self.inner
            .lock()
            .unwrap()
            .follows
            .insert((follower_id, following_id));
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        self.inner.lock().unwrap().users.get(&user_id).cloned()
    }

    pub fn tweet_ids(&self) -> Vec<i64> {
        self.inner.lock().unwrap().tweets.keys().copied().collect()
    }

    pub fn get_by_id_calls(&self) -> usize {
        self.get_by_id_calls.load(Ordering::SeqCst)
    }

    /// 让回复关联写入失败
    pub fn fail_reply_link(&self, fail: bool) {
        self.fail_reply_link.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn register(&self, user: &User) -> Result<User, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(duplicate("email"));
        }
        let now = Utc::now();
        let mut created = user.clone();
        created.user_id = Uuid::new_v4();
        created.role.get_or_insert_with(|| "user".to_string());
        created.created_at = now;
        created.updated_at = now;
        created.login_date = now;
        inner.users.insert(created.user_id, created.clone());
        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .users
            .get_mut(&user.user_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        if !user.user_name.is_empty() {
            stored.user_name = user.user_name.clone();
        }
        if !user.name.is_empty() {
            stored.name = user.name.clone();
        }
        if !user.email.is_empty() {
            stored.email = user.email.clone();
        }
        merge(&mut stored.about, &user.about);
        merge(&mut stored.avatar, &user.avatar);
        merge(&mut stored.header, &user.header);
        merge(&mut stored.phone_number, &user.phone_number);
        merge(&mut stored.country, &user.country);
        merge(&mut stored.gender, &user.gender);
        if user.birthday.is_some() {
            stored.birthday = user.birthday;
        }
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn update_role(&self, user: &User) -> Result<User, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .users
            .get_mut(&user.user_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        merge(&mut stored.role, &user.role);
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, user_id: Uuid) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.users.remove(&user_id).ok_or(sqlx::Error::RowNotFound)?;
        let edges: Vec<(Uuid, Uuid)> = inner
            .follows
            .iter()
            .filter(|(a, b)| *a == user_id || *b == user_id)
            .copied()
            .collect();
        inner.follows.retain(|(a, b)| *a != user_id && *b != user_id);
        inner.tweets.retain(|_, t| t.user_id != user_id);
        Ok(edges)
    }

    async fn get_by_id(&self, viewer_id: Uuid, user_id: Uuid) -> Result<User, sqlx::Error> {
        self.get_by_id_calls.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().unwrap();
        let user = inner.users.get(&user_id).ok_or(sqlx::Error::RowNotFound)?;
        Ok(inner.user_view(viewer_id, user))
    }

    async fn get_by_user_name(&self, viewer_id: Uuid, user_name: &str) -> Result<User, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let user = inner
            .users
            .values()
            .find(|u| u.user_name == user_name)
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok(inner.user_view(viewer_id, user))
    }

    async fn find_by_name(
        &self,
        viewer_id: Uuid,
        name: &str,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let needle = name.to_lowercase();
        let ids: Vec<Uuid> = inner
            .users
            .values()
            .filter(|u| {
                u.user_name.to_lowercase().contains(&needle) || u.name.to_lowercase().contains(&needle)
            })
            .map(|u| u.user_id)
            .collect();
        Ok(inner.users_page(viewer_id, ids.into_iter(), pq))
    }

    async fn get_users(&self, viewer_id: Uuid, pq: &PaginationQuery) -> Result<UsersList, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let ids: Vec<Uuid> = inner.users.keys().copied().collect();
        Ok(inner.users_page(viewer_id, ids.into_iter(), pq))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl FollowRepository for MemoryDb {
    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&follower_id) || !inner.users.contains_key(&following_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        if !inner.follows.insert((follower_id, following_id)) {
            return Err(duplicate("follow"));
        }
        Ok(())
    }

    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.follows.remove(&(follower_id, following_id)) {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn get_followers(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let ids: Vec<Uuid> = inner
            .follows
            .iter()
            .filter(|(_, b)| *b == user_id)
            .map(|(a, _)| *a)
            .collect();
        Ok(inner.users_page(viewer_id, ids.into_iter(), pq))
    }

    async fn get_following(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let ids: Vec<Uuid> = inner
            .follows
            .iter()
            .filter(|(a, _)| *a == user_id)
            .map(|(_, b)| *b)
            .collect();
        Ok(inner.users_page(viewer_id, ids.into_iter(), pq))
    }
}

#[async_trait]
impl TweetRepository for MemoryDb {
    async fn create(&self, tweet: &Tweet) -> Result<Tweet, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_tweet_id += 1;
        let created = Tweet {
            id: inner.next_tweet_id,
            created_at: Utc::now(),
            likes: 0,
            replys: 0,
            ..tweet.clone()
        };
        inner.tweets.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_reply(&self, tweet_id: i64, reply_id: i64) -> Result<(), sqlx::Error> {
        if self.fail_reply_link.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.inner.lock().unwrap().replys.insert((tweet_id, reply_id));
        Ok(())
    }

    async fn check_tweet_exist(&self, tweet_id: i64) -> Result<bool, sqlx::Error> {
        Ok(self.inner.lock().unwrap().tweets.contains_key(&tweet_id))
    }

    async fn get_tweet_by_id(&self, viewer_id: Uuid, tweet_id: i64) -> Result<TweetWithUser, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        inner
            .tweets
            .get(&tweet_id)
            .and_then(|t| inner.tweet_view(viewer_id, t))
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn get_tweets(&self, viewer_id: Uuid, pq: &PaginationQuery) -> Result<TweetsList, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let ids: Vec<i64> = inner.tweets.keys().copied().collect();
        Ok(inner.tweets_page(viewer_id, ids.into_iter(), pq))
    }

    async fn get_tweets_by_user_id(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let ids: Vec<i64> = inner
            .tweets
            .values()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.id)
            .collect();
        Ok(inner.tweets_page(viewer_id, ids.into_iter(), pq))
    }

    async fn get_reply_tweets(
        &self,
        viewer_id: Uuid,
        tweet_id: i64,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let ids: Vec<i64> = inner
            .replys
            .iter()
            .filter(|(t, _)| *t == tweet_id)
            .map(|(_, r)| *r)
            .collect();
        Ok(inner.tweets_page(viewer_id, ids.into_iter(), pq))
    }

    async fn delete(&self, tweet_id: i64) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.tweets.remove(&tweet_id).ok_or(sqlx::Error::RowNotFound)?;
        inner.replys.retain(|(t, r)| *t != tweet_id && *r != tweet_id);
        inner.likes.retain(|(_, t)| *t != tweet_id);
        Ok(())
    }
}

#[async_trait]
impl LikeRepository for MemoryDb {
    async fn like(&self, user_id: Uuid, tweet_id: i64) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.tweets.contains_key(&tweet_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        if !inner.likes.insert((user_id, tweet_id)) {
            return Err(duplicate("like"));
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, tweet_id: i64) -> Result<(), sqlx::Error> {
        if !self.inner.lock().unwrap().likes.remove(&(user_id, tweet_id)) {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn get_liked_tweets(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let ids: Vec<i64> = inner
            .likes
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, t)| *t)
            .collect();
        Ok(inner.tweets_page(viewer_id, ids.into_iter(), pq))
    }

    async fn get_liked_users(
        &self,
        viewer_id: Uuid,
        tweet_id: i64,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let ids: Vec<Uuid> = inner
            .likes
            .iter()
            .filter(|(_, t)| *t == tweet_id)
            .map(|(u, _)| *u)
            .collect();
        Ok(inner.users_page(viewer_id, ids.into_iter(), pq))
    }
}

/// 基于内存存储的测试环境
pub struct TestApp {
    pub state: AppState,
    pub db: Arc<MemoryDb>,
    pub store: Arc<MemoryStore>,
    pub upload_dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDb::new());
        let store = Arc::new(MemoryStore::new());
        let upload_dir = tempfile::tempdir().unwrap();

        let mut config = Config::for_tests();
        config.upload_dir = upload_dir.path().to_string_lossy().into_owned();

        let repos = Repositories {
            users: db.clone(),
            follows: db.clone(),
            tweets: db.clone(),
            likes: db.clone(),
        };
        let files = Arc::new(LocalFileRepository::new(upload_dir.path()));
        let state = AppState::new(config, repos, store.clone(), files);

        Self {
            state,
            db,
            store,
            upload_dir,
        }
    }
}
