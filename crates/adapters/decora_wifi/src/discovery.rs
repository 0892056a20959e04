//! Switch discovery across every residence the user can reach.

use crate::api::{DecoraApi, IotSwitch, Permission, PersonId};
use crate::error::DecoraError;

/// Walk `person`'s residential permissions in order and collect every switch.
///
/// Account grants expand to all of the account's residences. Duplicates are
/// kept; the first failing call aborts the walk.
///
/// # Errors
///
/// Returns the first [`DecoraError`] raised by the API.
pub async fn discover_switches<A: DecoraApi>(
    api: &A,
    person: PersonId,
) -> Result<Vec<IotSwitch>, DecoraError> {
    let mut switches = Vec::new();

    for permission in api.residential_permissions(person).await? {
        match permission {
            Permission::Account(account) => {
                for residence in api.residences(account).await? {
                    tracing::debug!(%account, residence = %residence.id, "listing switches");
                    switches.extend(api.iot_switches(residence.id).await?);
                }
            }
            Permission::Residence(residence) => {
                tracing::debug!(%residence, "listing switches");
                switches.extend(api.iot_switches(residence).await?);
            }
            Permission::Other => {}
        }
    }

    tracing::debug!(count = switches.len(), "myLeviton switches discovered");
    Ok(switches)
}

/// Keep only DW4SF fan switches, preserving order.
pub fn fan_switches(switches: Vec<IotSwitch>) -> impl Iterator<Item = IotSwitch> {
    switches.into_iter().filter(IotSwitch::is_fan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ResidenceId, ResidentialAccountId, SwitchId};
    use crate::testing::{FakeApi, switch};

    fn ids(switches: &[IotSwitch]) -> Vec<i64> {
        switches.iter().map(|s| s.id.0).collect()
    }

    #[tokio::test]
    async fn should_flatten_switches_in_permission_order() {
        let api = FakeApi::default();
        api.add_permission(Permission::Account(ResidentialAccountId(10)));
        api.add_permission(Permission::Residence(ResidenceId(30)));
        api.add_residence(ResidentialAccountId(10), ResidenceId(20));
        api.add_residence(ResidentialAccountId(10), ResidenceId(21));
        api.add_switch(ResidenceId(20), switch(1, "A", "DW4SF"));
        api.add_switch(ResidenceId(21), switch(2, "B", "DW6HD"));
        api.add_switch(ResidenceId(30), switch(3, "C", "DW4SF"));

        let switches = discover_switches(&api, PersonId(1)).await.unwrap();

        assert_eq!(ids(&switches), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn should_skip_permissions_without_target() {
        let api = FakeApi::default();
        api.add_permission(Permission::Other);
        api.add_permission(Permission::Residence(ResidenceId(5)));
        api.add_switch(ResidenceId(5), switch(9, "Fan", "DW4SF"));

        let switches = discover_switches(&api, PersonId(1)).await.unwrap();

        assert_eq!(ids(&switches), vec![9]);
    }

    #[tokio::test]
    async fn should_keep_duplicates_reached_twice() {
        let api = FakeApi::default();
        api.add_permission(Permission::Account(ResidentialAccountId(1)));
        api.add_permission(Permission::Residence(ResidenceId(2)));
        api.add_residence(ResidentialAccountId(1), ResidenceId(2));
        api.add_switch(ResidenceId(2), switch(4, "Fan", "DW4SF"));

        let switches = discover_switches(&api, PersonId(1)).await.unwrap();

        assert_eq!(ids(&switches), vec![4, 4]);
    }

    #[tokio::test]
    async fn should_return_empty_list_without_permissions() {
        let api = FakeApi::default();
        let switches = discover_switches(&api, PersonId(1)).await.unwrap();
        assert!(switches.is_empty());
    }

    #[tokio::test]
    async fn should_stop_on_first_failure() {
        let api = FakeApi::default();
        api.add_permission(Permission::Residence(ResidenceId(1)));
        api.add_permission(Permission::Residence(ResidenceId(2)));
        api.fail_residence(ResidenceId(1));

        let result = discover_switches(&api, PersonId(1)).await;

        assert!(matches!(result, Err(DecoraError::Api { status: 503, .. })));
    }

    #[test]
    fn should_keep_only_fan_models_in_order() {
        let fans: Vec<_> = fan_switches(vec![
            switch(1, "Fan 1", "DW4SF"),
            switch(2, "Dimmer", "DW6HD"),
            switch(3, "Plug", "DW15P"),
            switch(4, "Fan 2", "DW4SF"),
            switch(5, "lowercase", "dw4sf"),
        ])
        .collect();

        assert_eq!(
            fans.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![SwitchId(1), SwitchId(4)]
        );
    }
}
