use crate::{
  entity::{AccountRole, account},
  prelude::*,
};

/// Sponsor hierarchy maintenance and queries. The stored `group_root_id`
/// is a read-shortcut of the sponsor chain and is repointed eagerly on
/// every mutation.
pub struct Referral<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Referral<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Attach `reseller_id` under `sponsor_id`. Rejects cycles before any
  /// mutation; on success the moved subtree's group root is repointed in
  /// the same transaction.
  pub async fn assign_sponsor(
    &self,
    reseller_id: i64,
    sponsor_id: i64,
  ) -> Result<()> {
    let txn = self.db.begin().await?;
    Self::assign_sponsor_on(&txn, reseller_id, sponsor_id).await?;
    txn.commit().await?;
    Ok(())
  }

  /// Runs on the caller's transaction; registration composes this with
  /// the account insert so a failed lookup leaves no account behind.
  pub(crate) async fn assign_sponsor_on<C: ConnectionTrait>(
    conn: &C,
    reseller_id: i64,
    sponsor_id: i64,
  ) -> Result<()> {
    if reseller_id == sponsor_id {
      return Err(Error::CyclicReferral);
    }

    let reseller = account::Entity::find_by_id(reseller_id)
      .one(conn)
      .await?
      .ok_or(Error::AccountNotFound)?;
    let sponsor = account::Entity::find_by_id(sponsor_id)
      .one(conn)
      .await?
      .ok_or(Error::AccountNotFound)?;

    match (reseller.role, sponsor.role) {
      (AccountRole::Reseller, AccountRole::Reseller) => {}
      _ => return Err(Error::RoleNotPermitted),
    }

    // the sponsor must not sit below the reseller: climbing from the
    // sponsor can never reach the reseller
    let mut seen = HashSet::from([sponsor_id]);
    let mut cursor = sponsor.sponsor_id;
    while let Some(id) = cursor {
      if id == reseller_id {
        return Err(Error::CyclicReferral);
      }
      if !seen.insert(id) {
        warn!("referral chain cycle detected at account {}", id);
        break;
      }
      cursor = account::Entity::find_by_id(id)
        .one(conn)
        .await?
        .and_then(|node| node.sponsor_id);
    }

    let root = sponsor.group_root_id;
    account::ActiveModel {
      sponsor_id: Set(Some(sponsor_id)),
      group_root_id: Set(root),
      ..reseller.into()
    }
    .update(conn)
    .await?;

    let descendants = Self::descendants_on(conn, reseller_id).await?;
    if !descendants.is_empty() {
      use sea_orm::sea_query::Expr;

      let ids: Vec<i64> = descendants.iter().map(|node| node.id).collect();
      account::Entity::update_many()
        .col_expr(account::Column::GroupRootId, Expr::value(root))
        .filter(account::Column::Id.is_in(ids))
        .exec(conn)
        .await?;
    }

    Ok(())
  }

  /// Ancestors nearest-first: direct sponsor, then its sponsor, until
  /// the root or `max_levels`.
  pub async fn ancestors_of(
    &self,
    reseller_id: i64,
    max_levels: Option<u32>,
  ) -> Result<Vec<account::Model>> {
    Self::ancestors_on(self.db, reseller_id, max_levels).await
  }

  pub(crate) async fn ancestors_on<C: ConnectionTrait>(
    conn: &C,
    reseller_id: i64,
    max_levels: Option<u32>,
  ) -> Result<Vec<account::Model>> {
    let start = account::Entity::find_by_id(reseller_id)
      .one(conn)
      .await?
      .ok_or(Error::AccountNotFound)?;

    let mut seen = HashSet::from([reseller_id]);
    let mut cursor = start.sponsor_id;
    let mut ancestors = Vec::new();

    while let Some(id) = cursor {
      if let Some(cap) = max_levels {
        if ancestors.len() as u32 >= cap {
          break;
        }
      }
      if !seen.insert(id) {
        warn!("referral chain cycle detected at account {}", id);
        break;
      }
      let Some(node) = account::Entity::find_by_id(id).one(conn).await? else {
        break;
      };
      cursor = node.sponsor_id;
      ancestors.push(node);
    }

    Ok(ancestors)
  }

  /// Full downline, breadth-first. The visited set keeps traversal
  /// finite even if a cycle slipped into the data.
  pub async fn descendants_of(
    &self,
    reseller_id: i64,
  ) -> Result<Vec<account::Model>> {
    Self::descendants_on(self.db, reseller_id).await
  }

  pub(crate) async fn descendants_on<C: ConnectionTrait>(
    conn: &C,
    reseller_id: i64,
  ) -> Result<Vec<account::Model>> {
    let mut seen = HashSet::from([reseller_id]);
    let mut frontier = vec![reseller_id];
    let mut downline = Vec::new();

    while !frontier.is_empty() {
      let children = account::Entity::find()
        .filter(account::Column::SponsorId.is_in(frontier))
        .all(conn)
        .await?;

      frontier = Vec::new();
      for child in children {
        if seen.insert(child.id) {
          frontier.push(child.id);
          downline.push(child);
        }
      }
    }

    Ok(downline)
  }

  /// Recompute every reseller's stored group root from its sponsor
  /// chain. Idempotent maintenance pass; returns how many rows drifted.
  pub async fn reconcile_roots(&self) -> Result<u64> {
    use sea_orm::sea_query::Expr;

    let resellers = account::Entity::find()
      .filter(account::Column::Role.eq(AccountRole::Reseller))
      .all(self.db)
      .await?;

    let sponsors: HashMap<i64, Option<i64>> =
      resellers.iter().map(|node| (node.id, node.sponsor_id)).collect();

    let mut fixed = 0;
    for reseller in &resellers {
      let mut seen = HashSet::from([reseller.id]);
      let mut root = reseller.id;
      let mut cursor = reseller.sponsor_id;

      while let Some(id) = cursor {
        if !seen.insert(id) {
          warn!("referral chain cycle detected at account {}", id);
          break;
        }
        root = id;
        cursor = sponsors.get(&id).copied().flatten();
      }

      if reseller.group_root_id != root {
        account::Entity::update_many()
          .col_expr(account::Column::GroupRootId, Expr::value(root))
          .filter(account::Column::Id.eq(reseller.id))
          .exec(self.db)
          .await?;
        fixed += 1;
      }
    }

    if fixed > 0 {
      info!("reconciled {} drifted group roots", fixed);
    }
    Ok(fixed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  #[tokio::test]
  async fn test_assign_sponsor_sets_root() {
    let db = test_db::setup().await;
    let sv = Referral::new(&db);

    let a = test_db::reseller(&db, "A", 100_000, 50_000).await;
    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;

    sv.assign_sponsor(b.id, a.id).await.unwrap();

    let b = account::Entity::find_by_id(b.id).one(&db).await.unwrap().unwrap();
    assert_eq!(b.sponsor_id, Some(a.id));
    assert_eq!(b.group_root_id, a.id);
  }

  #[tokio::test]
  async fn test_assign_sponsor_repoints_subtree() {
    let db = test_db::setup().await;
    let sv = Referral::new(&db);

    let a = test_db::reseller(&db, "A", 100_000, 50_000).await;
    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    let c = test_db::reseller(&db, "C", 70_000, 20_000).await;

    sv.assign_sponsor(c.id, b.id).await.unwrap();
    // moving B under A must drag C's root along
    sv.assign_sponsor(b.id, a.id).await.unwrap();

    let c = account::Entity::find_by_id(c.id).one(&db).await.unwrap().unwrap();
    assert_eq!(c.sponsor_id, Some(b.id));
    assert_eq!(c.group_root_id, a.id);
  }

  #[tokio::test]
  async fn test_cycle_rejected_without_mutation() {
    let db = test_db::setup().await;
    let sv = Referral::new(&db);

    let a = test_db::reseller(&db, "A", 100_000, 50_000).await;
    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    let c = test_db::reseller(&db, "C", 70_000, 20_000).await;

    sv.assign_sponsor(b.id, a.id).await.unwrap();
    sv.assign_sponsor(c.id, b.id).await.unwrap();

    // C's chain leads to A, so A cannot go under C
    let result = sv.assign_sponsor(a.id, c.id).await;
    assert!(matches!(result, Err(Error::CyclicReferral)));

    let result = sv.assign_sponsor(a.id, a.id).await;
    assert!(matches!(result, Err(Error::CyclicReferral)));

    let a = account::Entity::find_by_id(a.id).one(&db).await.unwrap().unwrap();
    assert!(a.sponsor_id.is_none());
    assert_eq!(a.group_root_id, a.id);
  }

  #[tokio::test]
  async fn test_ancestors_nearest_first() {
    let db = test_db::setup().await;
    let sv = Referral::new(&db);

    let a = test_db::reseller(&db, "A", 100_000, 50_000).await;
    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    let c = test_db::reseller(&db, "C", 70_000, 20_000).await;

    sv.assign_sponsor(b.id, a.id).await.unwrap();
    sv.assign_sponsor(c.id, b.id).await.unwrap();

    let ancestors = sv.ancestors_of(c.id, None).await.unwrap();
    let ids: Vec<i64> = ancestors.iter().map(|node| node.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);

    let capped = sv.ancestors_of(c.id, Some(1)).await.unwrap();
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].id, b.id);
  }

  #[tokio::test]
  async fn test_descendants_all_levels() {
    let db = test_db::setup().await;
    let sv = Referral::new(&db);

    let a = test_db::reseller(&db, "A", 100_000, 50_000).await;
    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    let c = test_db::reseller(&db, "C", 70_000, 20_000).await;
    let d = test_db::reseller(&db, "D", 60_000, 10_000).await;

    sv.assign_sponsor(b.id, a.id).await.unwrap();
    sv.assign_sponsor(c.id, a.id).await.unwrap();
    sv.assign_sponsor(d.id, b.id).await.unwrap();

    let downline = sv.descendants_of(a.id).await.unwrap();
    let mut ids: Vec<i64> = downline.iter().map(|node| node.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![b.id, c.id, d.id]);
  }

  #[tokio::test]
  async fn test_reconcile_roots_repairs_drift() {
    use sea_orm::sea_query::Expr;

    let db = test_db::setup().await;
    let sv = Referral::new(&db);

    let a = test_db::reseller(&db, "A", 100_000, 50_000).await;
    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    sv.assign_sponsor(b.id, a.id).await.unwrap();

    // simulate drift behind the service's back
    account::Entity::update_many()
      .col_expr(account::Column::GroupRootId, Expr::value(b.id))
      .filter(account::Column::Id.eq(b.id))
      .exec(&db)
      .await
      .unwrap();

    assert_eq!(sv.reconcile_roots().await.unwrap(), 1);

    let b = account::Entity::find_by_id(b.id).one(&db).await.unwrap().unwrap();
    assert_eq!(b.group_root_id, a.id);

    // idempotent
    assert_eq!(sv.reconcile_roots().await.unwrap(), 0);
  }
}
