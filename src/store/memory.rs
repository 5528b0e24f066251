use super::{DocumentStore, FindPlan, Populate};
use crate::collection::Collection;
use crate::document::ID_FIELD;
use crate::engine::Engine;
use crate::errors::DbError;
use crate::query::{
    Filter, FindOptions, Projection, SortSpec, count_docs, find_docs, project_fields,
};
use crate::types::DocumentId;
use crate::utils::num::{u64_to_usize_saturating, usize_to_u64};
use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument};
use std::collections::HashMap;
use std::sync::Arc;

/// How a populate path maps onto another collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// The field holds the id (or a list of ids) of a document in `collection`.
    BelongsTo { collection: String },
    /// Virtual field: every document in `collection` whose `foreign_field` equals this `_id`.
    HasMany { collection: String, foreign_field: String },
}

impl Relation {
    #[must_use]
    pub fn belongs_to(collection: &str) -> Self {
        Self::BelongsTo { collection: collection.to_string() }
    }

    #[must_use]
    pub fn has_many(collection: &str, foreign_field: &str) -> Self {
        Self::HasMany {
            collection: collection.to_string(),
            foreign_field: foreign_field.to_string(),
        }
    }
}

/// `DocumentStore` adapter over one collection of the in-memory `Engine`.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    engine: Arc<Engine>,
    collection: String,
    relations: HashMap<String, Relation>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(engine: Arc<Engine>, collection: &str) -> Self {
        Self { engine, collection: collection.to_string(), relations: HashMap::new() }
    }

    #[must_use]
    pub fn with_relation(mut self, path: &str, relation: Relation) -> Self {
        self.relations.insert(path.to_string(), relation);
        self
    }

    fn populate(&self, docs: &mut [BsonDocument], spec: &Populate) -> Result<(), DbError> {
        let relation = self.relations.get(&spec.path).ok_or_else(|| {
            DbError::UnknownRelation(format!("{}.{}", self.collection, spec.path))
        })?;
        let projection = parse_projection(spec.select.as_deref())?;
        match relation {
            Relation::BelongsTo { collection } => {
                let target = self.engine.collection(collection)?;
                for d in docs.iter_mut() {
                    let resolved = match d.get(&spec.path) {
                        Some(Bson::String(id)) => resolve_one(&target, id, projection.as_ref()),
                        Some(Bson::Array(ids)) => Bson::Array(
                            ids.iter()
                                .filter_map(|v| match v {
                                    Bson::String(id) => {
                                        Some(resolve_one(&target, id, projection.as_ref()))
                                    }
                                    _ => None,
                                })
                                .collect(),
                        ),
                        _ => continue,
                    };
                    d.insert(spec.path.clone(), resolved);
                }
            }
            Relation::HasMany { collection, foreign_field } => {
                let target = self.engine.collection(collection)?;
                let opts = FindOptions { projection: projection.clone(), ..FindOptions::default() };
                for d in docs.iter_mut() {
                    let Some(Bson::String(id)) = d.get(ID_FIELD).cloned() else { continue };
                    let children = find_docs(&target, &Filter::eq(foreign_field, id), &opts);
                    d.insert(
                        spec.path.clone(),
                        Bson::Array(children.into_iter().map(|c| Bson::Document(c.data)).collect()),
                    );
                }
            }
        }
        Ok(())
    }
}

fn parse_projection(select: Option<&str>) -> Result<Option<Projection>, DbError> {
    Ok(select.map(Projection::parse).transpose()?.flatten())
}

// Dangling or malformed references resolve to null rather than failing the whole read.
fn resolve_one(target: &Collection, id: &str, projection: Option<&Projection>) -> Bson {
    let Ok(id) = id.parse::<DocumentId>() else { return Bson::Null };
    match target.find_document(&id) {
        Some(doc) => Bson::Document(match projection {
            Some(p) => project_fields(&doc.data, p),
            None => doc.data,
        }),
        None => Bson::Null,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.collection
    }

    async fn execute(&self, plan: FindPlan) -> Result<Vec<BsonDocument>, DbError> {
        let col = self.engine.collection(&self.collection)?;
        let opts = FindOptions {
            projection: parse_projection(plan.select.as_deref())?,
            sort: plan.sort.as_deref().map(SortSpec::parse_list).filter(|s| !s.is_empty()),
            skip: plan.skip.map(u64_to_usize_saturating),
            limit: plan.limit.map(u64_to_usize_saturating),
        };
        let mut docs: Vec<BsonDocument> =
            find_docs(&col, &plan.filter, &opts).into_iter().map(|d| d.data).collect();
        for spec in &plan.populate {
            self.populate(&mut docs, spec)?;
        }
        Ok(docs)
    }

    async fn count(&self, filter: Option<&Filter>) -> Result<u64, DbError> {
        let col = self.engine.collection(&self.collection)?;
        let n = match filter {
            Some(f) => count_docs(&col, f),
            None => col.len(),
        };
        Ok(usize_to_u64(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::store::DocumentStoreExt;
    use bson::doc;

    const CAMP: &str = "5d713995b721c3bb38c1f5d0";

    fn engine() -> Arc<Engine> {
        let engine = Arc::new(Engine::new());
        let camps = engine.create_collection("bootcamps");
        let camp = doc! {"_id": CAMP, "name": "Devworks", "description": "d", "housing": true};
        camps.insert_document(Document::new(camp).unwrap()).unwrap();
        let courses = engine.create_collection("courses");
        for (title, weeks) in [("Front End", 8), ("Full Stack", 12)] {
            let course = doc! {"title": title, "weeks": weeks, "bootcamp": CAMP};
            courses.insert_document(Document::new(course).unwrap()).unwrap();
        }
        let orphan = doc! {"title": "Orphan", "weeks": 1, "bootcamp": "bad"};
        courses.insert_document(Document::new(orphan).unwrap()).unwrap();
        engine
    }

    #[tokio::test]
    async fn belongs_to_replaces_reference() {
        let store = MemoryStore::new(engine(), "courses")
            .with_relation("bootcamp", Relation::belongs_to("bootcamps"));
        let docs = store
            .find(Filter::True)
            .sort("title")
            .populate(Populate::path("bootcamp").select("name description"))
            .exec()
            .await
            .unwrap();
        let camp = docs[0].get_document("bootcamp").unwrap();
        assert_eq!(camp.get_str("name").unwrap(), "Devworks");
        assert!(!camp.contains_key("housing"));
        assert_eq!(docs[2].get_str("title").unwrap(), "Orphan");
        assert_eq!(docs[2].get("bootcamp"), Some(&Bson::Null));
    }

    #[tokio::test]
    async fn has_many_adds_virtual_list() {
        let store = MemoryStore::new(engine(), "bootcamps")
            .with_relation("courses", Relation::has_many("courses", "bootcamp"));
        let docs = store.find(Filter::True).populate("courses").exec().await.unwrap();
        let courses = docs[0].get_array("courses").unwrap();
        assert_eq!(courses.len(), 2);
    }

    #[tokio::test]
    async fn unknown_relation_fails() {
        let store = MemoryStore::new(engine(), "courses");
        let err = store.find(Filter::True).populate("author").exec().await.unwrap_err();
        assert!(matches!(err, DbError::UnknownRelation(_)));
    }

    #[tokio::test]
    async fn count_with_and_without_filter() {
        let store = MemoryStore::new(engine(), "courses");
        assert_eq!(store.count(None).await.unwrap(), 3);
        let f = Filter::eq("bootcamp", CAMP);
        assert_eq!(store.count(Some(&f)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_collection_surfaces_as_store_error() {
        let store = MemoryStore::new(Arc::new(Engine::new()), "nope");
        assert!(matches!(store.count(None).await, Err(DbError::NoSuchCollection(_))));
    }
}
