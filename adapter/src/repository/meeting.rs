use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::MeetingId,
    meeting::{
        event::{CreateMeeting, DeployMeeting, TransitionMeeting, UpdateParticipant},
        lifecycle::{LifecycleState, Transition},
        Meeting,
    },
};
use kernel::repository::meeting::MeetingRepository;
use shared::error::{AppError, AppResult};
use sqlx::{Postgres, Transaction};

use crate::database::{
    model::meeting::{MeetingRow, MeetingStateRow, MEETING_COLUMNS},
    ConnectionPool,
};

#[derive(new)]
pub struct MeetingRepositoryImpl {
    db: ConnectionPool,
}

// The user list a participant change lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserList {
    Rsvp,
    Cancel,
    Attend,
    Withdraw,
}

impl UserList {
    const ALL: [UserList; 4] = [
        UserList::Rsvp,
        UserList::Cancel,
        UserList::Attend,
        UserList::Withdraw,
    ];

    fn column(self) -> &'static str {
        match self {
            UserList::Rsvp => "rsvp",
            UserList::Cancel => "cancel",
            UserList::Attend => "attend",
            UserList::Withdraw => "withdraw",
        }
    }
}

#[async_trait]
impl MeetingRepository for MeetingRepositoryImpl {
    async fn find_all(&self) -> AppResult<Vec<Meeting>> {
        let rows = sqlx::query_as::<_, MeetingRow>(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings ORDER BY created_at ASC"
        ))
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(MeetingRow::into_meeting).collect()
    }

    async fn find_by_id(&self, meeting_id: &MeetingId) -> AppResult<Option<Meeting>> {
        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE meeting_id = $1"
        ))
        .bind(meeting_id.as_str())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(MeetingRow::into_meeting).transpose()
    }

    async fn create(&self, event: CreateMeeting) -> AppResult<Meeting> {
        event.check()?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
                INSERT INTO meetings
                (meeting_id, state, is_deployed, name, location, description,
                images, videos, stake, max_participants,
                start_date_time, end_date_time, organizer,
                deployer_contract_address, parent_id)
                VALUES ($1, $2, FALSE, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(event.tx_hash.as_str())
        .bind(LifecycleState::Pending.as_ref())
        .bind(&event.name)
        .bind(&event.location)
        .bind(&event.description)
        .bind(&event.images)
        .bind(&event.videos)
        .bind(event.stake)
        .bind(event.max_participants)
        .bind(event.start_date_time)
        .bind(event.end_date_time)
        .bind(event.organizer.as_str())
        .bind(&event.deployer_contract_address)
        .bind(event.parent.as_ref().map(MeetingId::as_str))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(format!(
                "meeting {} already exists",
                event.tx_hash
            )),
            e => AppError::SpecificOperationError(e),
        })?;

        // Only the first continuation of a meeting becomes its child.
        if let Some(parent) = &event.parent {
            sqlx::query(
                r#"
                    UPDATE meetings SET child_id = $1
                    WHERE meeting_id = $2 AND child_id IS NULL
                "#,
            )
            .bind(event.tx_hash.as_str())
            .bind(parent.as_str())
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(meeting_id = %event.tx_hash, "meeting created");
        row.into_meeting()
    }

    async fn deploy(&self, event: DeployMeeting) -> AppResult<Meeting> {
        let DeployMeeting {
            tx_hash,
            meeting_address,
        } = event;
        if meeting_address.is_empty() {
            return Err(AppError::UnprocessableEntity(
                "a contract address is required".into(),
            ));
        }

        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let current = lock_state(&mut tx, &tx_hash).await?;
        let next = current
            .apply(Transition::Deploy)
            .map_err(|e| AppError::Conflict(e.to_string()))?;

        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
                UPDATE meetings
                SET meeting_id = $1, state = $2, is_deployed = TRUE
                WHERE meeting_id = $3
                RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(meeting_address.as_str())
        .bind(next.as_ref())
        .bind(tx_hash.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(format!(
                "meeting {meeting_address} already exists"
            )),
            e => AppError::SpecificOperationError(e),
        })?;

        // Series links and user lists still point at the transaction hash.
        sqlx::query("UPDATE meetings SET parent_id = $1 WHERE parent_id = $2")
            .bind(meeting_address.as_str())
            .bind(tx_hash.as_str())
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        sqlx::query("UPDATE meetings SET child_id = $1 WHERE child_id = $2")
            .bind(meeting_address.as_str())
            .bind(tx_hash.as_str())
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        sqlx::query(
            r#"
                UPDATE users SET
                  rsvp = array_replace(rsvp, $2, $1),
                  cancel = array_replace(cancel, $2, $1),
                  attend = array_replace(attend, $2, $1),
                  withdraw = array_replace(withdraw, $2, $1)
                WHERE $2 = ANY(rsvp) OR $2 = ANY(cancel)
                  OR $2 = ANY(attend) OR $2 = ANY(withdraw)
            "#,
        )
        .bind(meeting_address.as_str())
        .bind(tx_hash.as_str())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(%tx_hash, %meeting_address, "meeting deployed");
        row.into_meeting()
    }

    async fn register(&self, event: UpdateParticipant) -> AppResult<Meeting> {
        let mut tx = self.db.begin().await?;

        // Capacity, state and duplicates are all checked by the update itself
        // so two concurrent registrations cannot overfill a meeting.
        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
                UPDATE meetings SET rsvp = array_append(rsvp, $2)
                WHERE meeting_id = $1
                  AND state = 'ACTIVE'
                  AND cardinality(rsvp) < max_participants
                  AND NOT ($2 = ANY(rsvp) OR $2 = ANY(attend) OR $2 = ANY(withdraw))
                RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(event.meeting_id.as_str())
        .bind(event.user_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Err(explain_unchanged(&mut tx, &event, UserList::Rsvp).await);
        };
        move_user_to(&mut tx, &event, UserList::Rsvp).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        row.into_meeting()
    }

    async fn cancel_registration(&self, event: UpdateParticipant) -> AppResult<Meeting> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
                UPDATE meetings SET rsvp = array_remove(rsvp, $2)
                WHERE meeting_id = $1
                  AND state = 'ACTIVE'
                  AND $2 = ANY(rsvp)
                RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(event.meeting_id.as_str())
        .bind(event.user_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Err(explain_unchanged(&mut tx, &event, UserList::Cancel).await);
        };
        move_user_to(&mut tx, &event, UserList::Cancel).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        row.into_meeting()
    }

    async fn mark_attendance(&self, event: UpdateParticipant) -> AppResult<Meeting> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
                UPDATE meetings SET
                  rsvp = array_remove(rsvp, $2),
                  attend = array_append(attend, $2)
                WHERE meeting_id = $1
                  AND state = 'STARTED'
                  AND $2 = ANY(rsvp)
                RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(event.meeting_id.as_str())
        .bind(event.user_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Err(explain_unchanged(&mut tx, &event, UserList::Attend).await);
        };
        move_user_to(&mut tx, &event, UserList::Attend).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        row.into_meeting()
    }

    async fn withdraw(&self, event: UpdateParticipant) -> AppResult<Meeting> {
        let mut tx = self.db.begin().await?;

        // Ended meetings pay attendees of a continued series; cancelled ones
        // refund everyone still registered.
        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
                UPDATE meetings SET
                  rsvp = array_remove(rsvp, $2),
                  attend = array_remove(attend, $2),
                  withdraw = array_append(withdraw, $2)
                WHERE meeting_id = $1
                  AND NOT $2 = ANY(withdraw)
                  AND (
                    (state = 'ENDED' AND parent_id IS NOT NULL AND $2 = ANY(attend))
                    OR (state = 'CANCELLED' AND $2 = ANY(rsvp))
                  )
                RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(event.meeting_id.as_str())
        .bind(event.user_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Err(explain_unchanged(&mut tx, &event, UserList::Withdraw).await);
        };
        move_user_to(&mut tx, &event, UserList::Withdraw).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;
        row.into_meeting()
    }

    async fn transition(&self, event: TransitionMeeting) -> AppResult<Meeting> {
        if event.transition == Transition::Deploy {
            return Err(AppError::InvalidRequest(
                "a meeting is deployed by moving it to its contract address".into(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let current = lock_state(&mut tx, &event.meeting_id).await?;
        let next = current
            .apply(event.transition)
            .map_err(|e| AppError::Conflict(e.to_string()))?;

        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
                UPDATE meetings SET state = $2
                WHERE meeting_id = $1
                RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(event.meeting_id.as_str())
        .bind(next.as_ref())
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            meeting_id = %event.meeting_id,
            from = %current,
            to = %next,
            "meeting transitioned"
        );
        row.into_meeting()
    }
}

impl MeetingRepositoryImpl {
    async fn set_transaction_serializable(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }
}

// Locks the meeting row for the rest of the transaction.
async fn lock_state(
    tx: &mut Transaction<'_, Postgres>,
    meeting_id: &MeetingId,
) -> AppResult<LifecycleState> {
    let row = sqlx::query_as::<_, MeetingStateRow>(
        r#"
            SELECT state, max_participants, rsvp, attend, withdraw
            FROM meetings
            WHERE meeting_id = $1
            FOR UPDATE
        "#,
    )
    .bind(meeting_id.as_str())
    .fetch_optional(&mut **tx)
    .await
    .map_err(AppError::SpecificOperationError)?;

    match row {
        Some(row) => row.lifecycle(),
        None => Err(AppError::EntityNotFound(format!(
            "meeting {meeting_id} was not found"
        ))),
    }
}

// Removes the meeting from every list of the user and appends it to `target`,
// creating the user on first contact.
async fn move_user_to(
    tx: &mut Transaction<'_, Postgres>,
    event: &UpdateParticipant,
    target: UserList,
) -> AppResult<()> {
    let assignments = UserList::ALL
        .iter()
        .map(|list| {
            let column = list.column();
            if *list == target {
                format!("{column} = array_append(array_remove(users.{column}, $2), $2)")
            } else {
                format!("{column} = array_remove(users.{column}, $2)")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let column = target.column();

    let res = sqlx::query(&format!(
        r#"
            INSERT INTO users (user_id, {column}) VALUES ($1, ARRAY[$2])
            ON CONFLICT (user_id) DO UPDATE SET {assignments}
        "#
    ))
    .bind(event.user_id.as_str())
    .bind(event.meeting_id.as_str())
    .execute(&mut **tx)
    .await
    .map_err(AppError::SpecificOperationError)?;

    if res.rows_affected() < 1 {
        return Err(AppError::NoRowsAffectedError(format!(
            "user {} was not updated",
            event.user_id
        )));
    }
    Ok(())
}

// Works out why a guarded roster update matched no row.
async fn explain_unchanged(
    tx: &mut Transaction<'_, Postgres>,
    event: &UpdateParticipant,
    target: UserList,
) -> AppError {
    let UpdateParticipant {
        meeting_id,
        user_id,
    } = event;
    let row = sqlx::query_as::<_, MeetingStateRow>(
        r#"
            SELECT state, max_participants, rsvp, attend, withdraw
            FROM meetings
            WHERE meeting_id = $1
        "#,
    )
    .bind(meeting_id.as_str())
    .fetch_optional(&mut **tx)
    .await;

    let row = match row {
        Ok(Some(row)) => row,
        Ok(None) => {
            return AppError::EntityNotFound(format!("meeting {meeting_id} was not found"))
        }
        Err(e) => return AppError::SpecificOperationError(e),
    };
    let state = match row.lifecycle() {
        Ok(state) => state,
        Err(e) => return e,
    };
    let user = user_id.as_str().to_owned();
    let in_rsvp = row.rsvp.contains(&user);
    let in_attend = row.attend.contains(&user);
    let in_withdraw = row.withdraw.contains(&user);

    match target {
        UserList::Rsvp if state != LifecycleState::Active => AppError::UnprocessableEntity(
            format!("meeting {meeting_id} is not open for registration ({state})"),
        ),
        UserList::Rsvp if in_rsvp || in_attend || in_withdraw => AppError::Conflict(format!(
            "user {user_id} is already registered for meeting {meeting_id}"
        )),
        UserList::Rsvp if row.is_full() => {
            AppError::Conflict(format!("meeting {meeting_id} is already full"))
        }
        UserList::Cancel if state != LifecycleState::Active => AppError::UnprocessableEntity(
            format!("registration to meeting {meeting_id} can no longer be cancelled ({state})"),
        ),
        UserList::Attend if state != LifecycleState::Started => AppError::UnprocessableEntity(
            format!("attendance is only taken while meeting {meeting_id} runs ({state})"),
        ),
        UserList::Cancel | UserList::Attend if !in_rsvp => AppError::UnprocessableEntity(
            format!("user {user_id} is not registered for meeting {meeting_id}"),
        ),
        UserList::Withdraw if in_withdraw => AppError::Conflict(format!(
            "user {user_id} has already withdrawn from meeting {meeting_id}"
        )),
        UserList::Withdraw if !(state.is_ended() || state.is_cancelled()) => {
            AppError::UnprocessableEntity(format!(
                "meeting {meeting_id} is neither ended nor cancelled ({state})"
            ))
        }
        UserList::Withdraw => AppError::UnprocessableEntity(format!(
            "user {user_id} has nothing to withdraw from meeting {meeting_id}"
        )),
        _ => AppError::NoRowsAffectedError(format!("meeting {meeting_id} was not updated")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::user::UserRepositoryImpl;
    use kernel::model::id::UserId;
    use kernel::repository::user::UserRepository;
    use sqlx::types::chrono::{TimeZone, Utc};

    fn new_meeting(tx_hash: &str, max_participants: i32, parent: Option<&str>) -> CreateMeeting {
        CreateMeeting::new(
            MeetingId::from(tx_hash),
            "Rust meetup".into(),
            "Tokyo".into(),
            "Monthly gathering".into(),
            vec!["cover.png".into()],
            vec![],
            0.5,
            max_participants,
            Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            UserId::from("0xorganizer"),
            "0xdeployer".into(),
            parent.map(MeetingId::from),
        )
    }

    fn participant(meeting: &str, user: &str) -> UpdateParticipant {
        UpdateParticipant::new(MeetingId::from(meeting), UserId::from(user))
    }

    async fn deployed(repo: &MeetingRepositoryImpl, address: &str, max: i32) -> anyhow::Result<()> {
        let tx_hash = format!("{address}-tx");
        repo.create(new_meeting(&tx_hash, max, None)).await?;
        repo.deploy(DeployMeeting::new(
            MeetingId::new(tx_hash),
            MeetingId::from(address),
        ))
        .await?;
        Ok(())
    }

    #[sqlx::test]
    async fn test_deploy_rekeys_meeting(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = MeetingRepositoryImpl::new(ConnectionPool::new(pool));

        let created = repo.create(new_meeting("0xtx", 3, None)).await?;
        assert_eq!(created.state, LifecycleState::Pending);
        assert!(!created.is_deployed);

        let deployed = repo
            .deploy(DeployMeeting::new(
                MeetingId::from("0xtx"),
                MeetingId::from("0xcontract"),
            ))
            .await?;
        assert_eq!(deployed.id, MeetingId::from("0xcontract"));
        assert_eq!(deployed.state, LifecycleState::Active);
        assert!(deployed.is_deployed);

        assert!(repo.find_by_id(&MeetingId::from("0xtx")).await?.is_none());
        let found = repo.find_by_id(&MeetingId::from("0xcontract")).await?;
        assert_eq!(found.map(|m| m.name), Some("Rust meetup".to_string()));
        assert_eq!(repo.find_all().await?.len(), 1);

        // A second deploy of the same hash has nothing left to move.
        let again = repo
            .deploy(DeployMeeting::new(
                MeetingId::from("0xtx"),
                MeetingId::from("0xother"),
            ))
            .await;
        assert!(matches!(again, Err(AppError::EntityNotFound(_))));
        Ok(())
    }

    #[sqlx::test]
    async fn test_series_links_follow_rekey(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = MeetingRepositoryImpl::new(ConnectionPool::new(pool));

        deployed(&repo, "0xfirst", 3).await?;
        repo.create(new_meeting("0xsecond-tx", 3, Some("0xfirst")))
            .await?;
        let parent = repo.find_by_id(&MeetingId::from("0xfirst")).await?;
        assert_eq!(
            parent.and_then(|m| m.child),
            Some(MeetingId::from("0xsecond-tx"))
        );

        repo.deploy(DeployMeeting::new(
            MeetingId::from("0xsecond-tx"),
            MeetingId::from("0xsecond"),
        ))
        .await?;
        let parent = repo.find_by_id(&MeetingId::from("0xfirst")).await?;
        assert_eq!(
            parent.and_then(|m| m.child),
            Some(MeetingId::from("0xsecond"))
        );
        Ok(())
    }

    #[sqlx::test]
    async fn test_register_respects_capacity(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let repo = MeetingRepositoryImpl::new(db.clone());
        let users = UserRepositoryImpl::new(db);
        deployed(&repo, "0xm", 1).await?;

        let meeting = repo.register(participant("0xm", "0xalice")).await?;
        assert_eq!(meeting.roster.rsvp, vec![UserId::from("0xalice")]);

        let full = repo.register(participant("0xm", "0xbob")).await;
        assert!(matches!(full, Err(AppError::Conflict(_))));

        let twice = repo.register(participant("0xm", "0xalice")).await;
        assert!(matches!(twice, Err(AppError::Conflict(_))));

        let alice = users.find_by_id(&UserId::from("0xalice")).await?;
        assert_eq!(alice.map(|u| u.rsvp), Some(vec![MeetingId::from("0xm")]));
        assert!(users.find_by_id(&UserId::from("0xbob")).await?.is_none());
        Ok(())
    }

    #[sqlx::test]
    async fn test_register_needs_active_meeting(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = MeetingRepositoryImpl::new(ConnectionPool::new(pool));
        repo.create(new_meeting("0xpending", 3, None)).await?;

        let pending = repo.register(participant("0xpending", "0xalice")).await;
        assert!(matches!(pending, Err(AppError::UnprocessableEntity(_))));

        let missing = repo.register(participant("0xnowhere", "0xalice")).await;
        assert!(matches!(missing, Err(AppError::EntityNotFound(_))));
        Ok(())
    }

    #[sqlx::test]
    async fn test_cancel_registration(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let repo = MeetingRepositoryImpl::new(db.clone());
        let users = UserRepositoryImpl::new(db);
        deployed(&repo, "0xm", 3).await?;

        repo.register(participant("0xm", "0xalice")).await?;
        let meeting = repo
            .cancel_registration(participant("0xm", "0xalice"))
            .await?;
        assert!(meeting.roster.rsvp.is_empty());

        let alice = users
            .find_by_id(&UserId::from("0xalice"))
            .await?
            .unwrap();
        assert!(alice.rsvp.is_empty());
        assert_eq!(alice.cancel, vec![MeetingId::from("0xm")]);
        Ok(())
    }

    #[sqlx::test]
    async fn test_attend_end_and_withdraw(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let repo = MeetingRepositoryImpl::new(db.clone());
        let users = UserRepositoryImpl::new(db);
        deployed(&repo, "0xfirst", 3).await?;
        repo.create(new_meeting("0xm-tx", 3, Some("0xfirst"))).await?;
        repo.deploy(DeployMeeting::new(
            MeetingId::from("0xm-tx"),
            MeetingId::from("0xm"),
        ))
        .await?;
        repo.register(participant("0xm", "0xalice")).await?;

        let early = repo.mark_attendance(participant("0xm", "0xalice")).await;
        assert!(matches!(early, Err(AppError::UnprocessableEntity(_))));

        let id = MeetingId::from("0xm");
        repo.transition(TransitionMeeting::new(id.clone(), Transition::Start))
            .await?;
        let meeting = repo.mark_attendance(participant("0xm", "0xalice")).await?;
        assert_eq!(meeting.roster.attend, vec![UserId::from("0xalice")]);

        let ended = repo
            .transition(TransitionMeeting::new(id.clone(), Transition::End))
            .await?;
        assert_eq!(ended.state, LifecycleState::Ended);

        let meeting = repo.withdraw(participant("0xm", "0xalice")).await?;
        assert_eq!(meeting.roster.withdraw, vec![UserId::from("0xalice")]);
        assert!(meeting.roster.attend.is_empty());

        let twice = repo.withdraw(participant("0xm", "0xalice")).await;
        assert!(matches!(twice, Err(AppError::Conflict(_))));

        let alice = users.find_by_id(&UserId::from("0xalice")).await?.unwrap();
        assert_eq!(alice.withdraw, vec![id]);
        assert!(alice.attend.is_empty());
        Ok(())
    }

    #[sqlx::test]
    async fn test_transition_table_is_enforced(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = MeetingRepositoryImpl::new(ConnectionPool::new(pool));
        deployed(&repo, "0xm", 3).await?;
        let id = MeetingId::from("0xm");

        let end_before_start = repo
            .transition(TransitionMeeting::new(id.clone(), Transition::End))
            .await;
        assert!(matches!(end_before_start, Err(AppError::Conflict(_))));

        let cancelled = repo
            .transition(TransitionMeeting::new(id.clone(), Transition::Cancel))
            .await?;
        assert_eq!(cancelled.state, LifecycleState::Cancelled);

        let start_cancelled = repo
            .transition(TransitionMeeting::new(id, Transition::Start))
            .await;
        assert!(matches!(start_cancelled, Err(AppError::Conflict(_))));
        Ok(())
    }

    #[sqlx::test]
    async fn test_withdraw_from_cancelled_meeting(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = MeetingRepositoryImpl::new(ConnectionPool::new(pool));
        deployed(&repo, "0xm", 3).await?;
        repo.register(participant("0xm", "0xalice")).await?;

        let open = repo.withdraw(participant("0xm", "0xalice")).await;
        assert!(matches!(open, Err(AppError::UnprocessableEntity(_))));

        repo.transition(TransitionMeeting::new(
            MeetingId::from("0xm"),
            Transition::Cancel,
        ))
        .await?;
        let meeting = repo.withdraw(participant("0xm", "0xalice")).await?;
        assert!(meeting.roster.rsvp.is_empty());
        assert_eq!(meeting.roster.withdraw, vec![UserId::from("0xalice")]);
        Ok(())
    }
}
