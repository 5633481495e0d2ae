//! Shared builders for domain service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    AssetHandle, AssetUpload, DisplayName, EmailAddress, NewPost, PasswordHash, Post, PostBody,
    PostId, PostSlug, PostTitle, User, UserId,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn sample_user(email: &str) -> User {
    User::new(
        UserId::random(),
        EmailAddress::new(email).expect("fixture email"),
        DisplayName::new("Ada").expect("fixture name"),
        PasswordHash::new("stored-hash"),
        fixture_timestamp(),
    )
}

pub(crate) fn sample_post(owner: &UserId, title: &str) -> Post {
    let title = PostTitle::new(title).expect("fixture title");
    Post::new(NewPost {
        id: PostId::random(),
        slug: PostSlug::from_title(&title, 1).expect("fixture slug"),
        title,
        body: PostBody::new("body text").expect("fixture body"),
        asset: AssetHandle::new("1-0.png").expect("fixture handle"),
        owner: owner.clone(),
        created_at: fixture_timestamp(),
    })
}

pub(crate) fn sample_upload() -> AssetUpload {
    AssetUpload::new(vec![0x89, 0x50, 0x4E, 0x47], "photo.png").expect("fixture upload")
}
