//! Models shared by the integration suites.

use chrono::{DateTime, Utc};
use tabula::{
    schema::{FieldMapping, JoinTable, Primitive, Relation},
    Builder, Model, ModelSchema, Result,
};

/// Soft deletable, with a profile, posts and tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub deleted_at: Option<DateTime<Utc>>,

    pub profile: Option<Profile>,
    pub posts: Vec<Post>,
    pub tags: Vec<Tag>,
}

impl User {
    pub fn new(name: &str, age: i64) -> User {
        User {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            age,
            ..User::default()
        }
    }
}

impl Model for User {
    fn schema() -> Result<ModelSchema<Self>> {
        ModelSchema::<Self>::builder("users")
            .field(
                FieldMapping::of::<i64>("id").primary_key().auto_increment(),
                |user| user.id.into(),
                |user, value| Ok(user.id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<String>("name").size(100),
                |user| user.name.as_str().into(),
                |user, value| Ok(user.name = value.try_into()?),
            )
            .field(
                FieldMapping::of::<String>("email").size(255),
                |user| user.email.as_str().into(),
                |user, value| Ok(user.email = value.try_into()?),
            )
            .field(
                FieldMapping::of::<i64>("age"),
                |user| user.age.into(),
                |user, value| Ok(user.age = value.try_into()?),
            )
            .field(
                FieldMapping::of::<Option<DateTime<Utc>>>("deleted_at"),
                |user| user.deleted_at.into(),
                |user, value| Ok(user.deleted_at = Primitive::load(value)?),
            )
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub bio: String,
}

impl Model for Profile {
    fn schema() -> Result<ModelSchema<Self>> {
        ModelSchema::<Self>::builder("profiles")
            .field(
                FieldMapping::of::<i64>("id").primary_key().auto_increment(),
                |profile| profile.id.into(),
                |profile, value| Ok(profile.id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<i64>("user_id"),
                |profile| profile.user_id.into(),
                |profile, value| Ok(profile.user_id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<String>("bio"),
                |profile| profile.bio.as_str().into(),
                |profile, value| Ok(profile.bio = value.try_into()?),
            )
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
}

impl Model for Post {
    fn schema() -> Result<ModelSchema<Self>> {
        ModelSchema::<Self>::builder("posts")
            .field(
                FieldMapping::of::<i64>("id").primary_key().auto_increment(),
                |post| post.id.into(),
                |post, value| Ok(post.id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<i64>("user_id"),
                |post| post.user_id.into(),
                |post, value| Ok(post.user_id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<String>("title").size(200),
                |post| post.title.as_str().into(),
                |post, value| Ok(post.title = value.try_into()?),
            )
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Model for Tag {
    fn schema() -> Result<ModelSchema<Self>> {
        ModelSchema::<Self>::builder("tags")
            .field(
                FieldMapping::of::<i64>("id").primary_key().auto_increment(),
                |tag| tag.id.into(),
                |tag, value| Ok(tag.id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<String>("name").size(50).unique(),
                |tag| tag.name.as_str().into(),
                |tag, value| Ok(tag.name = value.try_into()?),
            )
            .build()
    }
}

/// Join table between users and tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTag {
    pub id: i64,
    pub user_id: i64,
    pub tag_id: i64,
}

impl Model for UserTag {
    fn schema() -> Result<ModelSchema<Self>> {
        ModelSchema::<Self>::builder("user_tags")
            .field(
                FieldMapping::of::<i64>("id").primary_key().auto_increment(),
                |link| link.id.into(),
                |link, value| Ok(link.id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<i64>("user_id"),
                |link| link.user_id.into(),
                |link, value| Ok(link.user_id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<i64>("tag_id"),
                |link| link.tag_id.into(),
                |link, value| Ok(link.tag_id = value.try_into()?),
            )
            .build()
    }
}

/// No soft delete column, no relations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub qty: i64,
}

impl Item {
    pub fn new(name: impl Into<String>, qty: i64) -> Item {
        Item {
            id: 0,
            name: name.into(),
            qty,
        }
    }
}

impl Model for Item {
    fn schema() -> Result<ModelSchema<Self>> {
        ModelSchema::<Self>::builder("items")
            .field(
                FieldMapping::of::<i64>("id").primary_key().auto_increment(),
                |item| item.id.into(),
                |item, value| Ok(item.id = value.try_into()?),
            )
            .field(
                FieldMapping::of::<String>("name").size(100),
                |item| item.name.as_str().into(),
                |item, value| Ok(item.name = value.try_into()?),
            )
            .field(
                FieldMapping::of::<i64>("qty"),
                |item| item.qty.into(),
                |item, value| Ok(item.qty = value.try_into()?),
            )
            .build()
    }
}

/// Registers every model above.
pub fn register_all(builder: &mut Builder) -> &mut Builder {
    builder
        .register::<User>()
        .register::<Profile>()
        .register::<Post>()
        .register::<Tag>()
        .register::<UserTag>()
        .register::<Item>()
}

/// Registers the relations of [`User`].
pub fn relate_users(builder: &mut Builder) -> &mut Builder {
    builder
        .has_one::<User, Profile>(
            Relation::has_one("profile", "profiles", "user_id"),
            |user, profile| user.profile = profile,
        )
        .has_many::<User, Post>(
            Relation::has_many("posts", "posts", "user_id"),
            |user, posts| user.posts = posts,
        )
        .many_to_many::<User, Tag>(
            Relation::many_to_many(
                "tags",
                "tags",
                JoinTable {
                    name: "user_tags".to_string(),
                    owner_column: "user_id".to_string(),
                    target_column: "tag_id".to_string(),
                },
            ),
            |user, tags| user.tags = tags,
        )
}
