//! Well-formedness checks run on every declared graph.

use crate::descriptor::Deployment;
use crate::error::DeployError;
use crate::models::*;
use std::collections::HashSet;

/// Run every check; the first violation wins.
pub fn validate_deployment(deployment: &Deployment) -> Result<(), DeployError> {
    check_security_rules(&deployment.security_group)?;
    check_subnets(&deployment.virtual_network)?;
    check_linux_auth(&deployment.virtual_machine.properties.os_profile)?;
    check_disks(&deployment.virtual_machine.properties.storage_profile)?;
    log::debug!("Deployment '{}' is well-formed", deployment.resource_group.name);
    Ok(())
}

fn invalid(message: String) -> Result<(), DeployError> {
    Err(DeployError::InvalidDeployment(message))
}

/// At least one rule; priorities unique and in range; names unique.
pub fn check_security_rules(nsg: &NetworkSecurityGroup) -> Result<(), DeployError> {
    let rules = &nsg.properties.security_rules;
    if rules.is_empty() {
        return invalid(format!("security group '{}' has no rules", nsg.name));
    }

    let mut priorities = HashSet::new();
    let mut names = HashSet::new();
    for rule in rules {
        let priority = rule.properties.priority;
        if !(MIN_RULE_PRIORITY..=MAX_RULE_PRIORITY).contains(&priority) {
            return invalid(format!(
                "rule '{}' priority {priority} outside {MIN_RULE_PRIORITY}..={MAX_RULE_PRIORITY}",
                rule.name
            ));
        }
        if !priorities.insert((priority, rule.properties.direction)) {
            return invalid(format!(
                "rule '{}' reuses priority {priority} in group '{}'",
                rule.name, nsg.name
            ));
        }
        if !names.insert(rule.name.as_str()) {
            return invalid(format!("duplicate rule name '{}'", rule.name));
        }
    }
    Ok(())
}

/// Every subnet lies inside the address space; subnets do not overlap.
pub fn check_subnets(vnet: &VirtualNetwork) -> Result<(), DeployError> {
    let space = &vnet.properties.address_space.address_prefixes;
    if space.is_empty() {
        return invalid(format!("virtual network '{}' has no address space", vnet.name));
    }

    let subnets = &vnet.properties.subnets;
    for (i, subnet) in subnets.iter().enumerate() {
        let prefix = subnet.properties.address_prefix;
        if !prefix.is_network_address() {
            return invalid(format!(
                "subnet '{}' prefix {prefix} has host bits set",
                subnet.name
            ));
        }
        if !space.iter().any(|cidr| cidr.contains(&prefix)) {
            return invalid(format!(
                "subnet '{}' prefix {prefix} is outside the address space of '{}'",
                subnet.name, vnet.name
            ));
        }
        if let Some(other) = subnets[i + 1..]
            .iter()
            .find(|other| other.properties.address_prefix.overlaps(&prefix))
        {
            return invalid(format!(
                "subnet '{}' overlaps subnet '{}'",
                subnet.name, other.name
            ));
        }
    }
    Ok(())
}

/// Key-only authentication: supplied keys require password auth disabled,
/// and no password is ever set.
pub fn check_linux_auth(os_profile: &OsProfile) -> Result<(), DeployError> {
    if os_profile.admin_password.is_some() {
        return invalid(format!(
            "admin password set for '{}'; only SSH keys are allowed",
            os_profile.admin_username
        ));
    }
    let Some(linux) = &os_profile.linux_configuration else {
        return invalid("linux configuration missing".to_string());
    };
    if !linux.has_ssh_keys() {
        return invalid("no SSH public key configured".to_string());
    }
    if !linux.disable_password_authentication {
        return invalid("password authentication must be disabled when SSH keys are set".into());
    }
    Ok(())
}

/// OS disk from image, data disks empty, LUNs unique and in range.
pub fn check_disks(storage: &StorageProfile) -> Result<(), DeployError> {
    if storage.os_disk.create_option != DiskCreateOption::FromImage {
        return invalid(format!(
            "OS disk create option {:?}, expected FromImage",
            storage.os_disk.create_option
        ));
    }

    let mut luns = HashSet::new();
    for disk in &storage.data_disks {
        if disk.create_option != DiskCreateOption::Empty {
            return invalid(format!(
                "data disk '{}' create option {:?}, expected Empty",
                disk.name, disk.create_option
            ));
        }
        if disk.lun > MAX_LUN {
            return invalid(format!("data disk '{}' LUN {} > {MAX_LUN}", disk.name, disk.lun));
        }
        if !luns.insert(disk.lun) {
            return invalid(format!("data disk '{}' reuses LUN {}", disk.name, disk.lun));
        }
        if disk.disk_size_gb == 0 {
            return invalid(format!("data disk '{}' has zero size", disk.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;
    use crate::descriptor::declare;

    fn deployment() -> (tempfile::TempDir, Deployment) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("key.pub");
        std::fs::write(&path, "ssh-ed25519 AAAA test").expect("write key");
        let deployment = declare(&DeployConfig::new("ghadmin", &path)).expect("declare");
        (dir, deployment)
    }

    fn assert_invalid(result: Result<(), DeployError>, needle: &str) {
        match result {
            Err(DeployError::InvalidDeployment(msg)) => {
                assert!(msg.contains(needle), "'{msg}' should mention '{needle}'")
            }
            other => panic!("expected InvalidDeployment, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_graph_is_valid() {
        let (_dir, d) = deployment();
        validate_deployment(&d).expect("declared graph must validate");
    }

    #[test]
    fn test_duplicate_priority() {
        let (_dir, mut d) = deployment();
        d.security_group.properties.security_rules[1].properties.priority = 900;
        assert_invalid(check_security_rules(&d.security_group), "reuses priority 900");
    }

    #[test]
    fn test_priority_out_of_range() {
        let (_dir, mut d) = deployment();
        d.security_group.properties.security_rules[0].properties.priority = 4097;
        assert_invalid(check_security_rules(&d.security_group), "outside");
    }

    #[test]
    fn test_no_rules() {
        let (_dir, mut d) = deployment();
        d.security_group.properties.security_rules.clear();
        assert_invalid(check_security_rules(&d.security_group), "no rules");
    }

    #[test]
    fn test_subnet_outside_address_space() {
        let (_dir, mut d) = deployment();
        d.virtual_network.properties.subnets[0].properties.address_prefix =
            Ipv4::new("10.1.0.0/24").unwrap();
        assert_invalid(check_subnets(&d.virtual_network), "outside the address space");
    }

    #[test]
    fn test_overlapping_subnets() {
        let (_dir, mut d) = deployment();
        let mut second = d.virtual_network.properties.subnets[0].clone();
        second.name = "second".to_string();
        second.properties.address_prefix = Ipv4::new("10.0.0.128/25").unwrap();
        d.virtual_network.properties.subnets.push(second);
        assert_invalid(check_subnets(&d.virtual_network), "overlaps");
    }

    #[test]
    fn test_password_auth_enabled() {
        let (_dir, mut d) = deployment();
        let os = &mut d.virtual_machine.properties.os_profile;
        os.linux_configuration
            .as_mut()
            .unwrap()
            .disable_password_authentication = false;
        assert_invalid(check_linux_auth(os), "must be disabled");
    }

    #[test]
    fn test_password_set() {
        let (_dir, mut d) = deployment();
        let os = &mut d.virtual_machine.properties.os_profile;
        os.admin_password = Some("hunter2".to_string());
        assert_invalid(check_linux_auth(os), "only SSH keys");
    }

    #[test]
    fn test_lun_collision() {
        let (_dir, mut d) = deployment();
        let storage = &mut d.virtual_machine.properties.storage_profile;
        let mut extra = storage.data_disks[0].clone();
        extra.name = "extra".to_string();
        storage.data_disks.push(extra);
        assert_invalid(check_disks(storage), "reuses LUN 2");
    }

    #[test]
    fn test_disk_create_options() {
        let (_dir, mut d) = deployment();
        let storage = &mut d.virtual_machine.properties.storage_profile;
        storage.data_disks[0].create_option = DiskCreateOption::Attach;
        assert_invalid(check_disks(storage), "expected Empty");

        storage.os_disk.create_option = DiskCreateOption::Empty;
        assert_invalid(check_disks(storage), "expected FromImage");
    }
}
