use engine::{
    Actor, CreateFamilyAccountCmd, CreateFamilyGroupCmd, CreateSubAccountCmd, Engine, Money,
    TransferCmd, TransferRoute,
};
use migration::MigratorTrait;
use sea_orm::Database;
use uuid::Uuid;

pub async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build()
}

pub fn member_in(group: Uuid) -> Actor {
    Actor::member(Uuid::new_v4()).in_group(group)
}

/// A group with a funded family account and two member sub accounts.
pub struct Family {
    /// Group owner; an admin acting in the group.
    pub owner: Actor,
    pub bob: Actor,
    pub group: Uuid,
    pub pool: Uuid,
    pub sub_owner: Uuid,
    pub sub_bob: Uuid,
}

/// Builds the standard fixture: `pool` holds `pool_funds`, the owner's sub
/// account holds `sub_funds` moved out of the pool, bob's sub account is
/// empty.
pub async fn family_fixture(engine: &Engine, pool_funds: Money, sub_funds: Money) -> Family {
    let owner = Actor::admin(Uuid::new_v4());
    let group = engine
        .create_family_group(&owner, CreateFamilyGroupCmd::new("Smiths").default_group())
        .await
        .unwrap();
    let owner = owner.in_group(group.id);

    let pool = engine
        .create_family_account(&owner, CreateFamilyAccountCmd::new(group.id, "Pool"))
        .await
        .unwrap();

    let bob = member_in(group.id);
    engine.add_member(&owner, group.id, bob.id).await.unwrap();

    let sub_owner = engine
        .create_sub_account(&owner, CreateSubAccountCmd::new(pool.id, "Owner spending"))
        .await
        .unwrap();
    let sub_bob = engine
        .create_sub_account(&bob, CreateSubAccountCmd::new(pool.id, "Bob spending"))
        .await
        .unwrap();

    if pool_funds.is_positive() {
        engine
            .apply_transfer(
                &owner,
                TransferCmd::new(
                    TransferRoute::BankToFamily {
                        destination: pool.id,
                    },
                    pool_funds,
                ),
            )
            .await
            .unwrap();
    }
    if sub_funds.is_positive() {
        engine
            .apply_transfer(
                &owner,
                TransferCmd::new(
                    TransferRoute::FamilyToSub {
                        source: pool.id,
                        destination: sub_owner.id,
                    },
                    sub_funds,
                ),
            )
            .await
            .unwrap();
    }

    Family {
        owner,
        bob,
        group: group.id,
        pool: pool.id,
        sub_owner: sub_owner.id,
        sub_bob: sub_bob.id,
    }
}
