use crate::model::{DcId, GroupId, PDiskId, PDiskState, VDiskId, VDiskState};
use crate::simulation::{SimError, Simulation, SimulationParams, HOURS_PER_DAY, MAX_TICKS};

/// Parameters with failures switched off, so tests drive failures by hand.
/// 900 GB at 256 MB/s rebuilds in exactly one hour.
fn quiet_params(disks_per_dc: u32, spare_disks_per_dc: u32) -> SimulationParams {
    SimulationParams {
        disks_per_dc,
        spare_disks_per_dc,
        failure_rate_per_day: 0,
        disk_size_gb: 900,
        write_speed_mbps: 256,
        pdisk_recovery_hours: 0,
    }
}

/// The member of group 0 hosted on `pdisk`.
fn group0_member_on(sim: &Simulation, pdisk: PDiskId) -> VDiskId {
    sim.groups()[0]
        .members()
        .iter()
        .copied()
        .find(|&id| sim.vdisk(id).unwrap().pdisk_id() == pdisk)
        .unwrap()
}

/// Active PDisk ids of `dc` (spares excluded), in ascending order.
fn active_pdisks(sim: &Simulation, dc: DcId) -> Vec<PDiskId> {
    sim.pdisks_in_dc(dc)
        .iter()
        .copied()
        .filter(|&id| sim.pdisk(id).unwrap().state() == PDiskState::Active)
        .collect()
}

#[test]
fn test_replication_duration() {
    let params = quiet_params(10, 1);
    assert!((params.replication_hours() - 1.0).abs() < f64::EPSILON);

    let defaults = SimulationParams::default();
    let expected = 4096.0 * 1024.0 / 100.0 / 3600.0;
    assert!((defaults.replication_hours() - expected).abs() < 1e-12);
}

#[test]
fn test_no_failures_means_no_loss() {
    let mut sim = Simulation::new(quiet_params(30, 3), 5);
    for _ in 0..MAX_TICKS {
        sim.simulate_hour().unwrap();
    }
    assert!(sim.lost_groups().is_empty());
    assert!(sim.pdisks().iter().all(|p| !p.is_broken()));
    assert_eq!(sim.diagnostics().failures_injected, 0);
    assert!((sim.current_time() - f64::from(MAX_TICKS)).abs() < f64::EPSILON);
}

#[test]
fn test_iteration_limit_aborts() {
    let mut sim = Simulation::new(quiet_params(10, 1), 5);
    for _ in 0..MAX_TICKS {
        sim.simulate_hour().unwrap();
    }
    assert_eq!(sim.simulate_hour(), Err(SimError::IterationLimit { limit: MAX_TICKS }));
    assert!((sim.current_time() - f64::from(MAX_TICKS)).abs() < f64::EPSILON);
}

#[test]
fn test_reset_rewinds_clock() {
    let mut sim = Simulation::new(quiet_params(10, 1), 5);
    sim.fail_pdisk(PDiskId::from_raw(0)).unwrap();
    for _ in 0..10 {
        sim.simulate_hour().unwrap();
    }
    sim.reset();
    assert!(sim.current_time().abs() < f64::EPSILON);
    assert!(sim.pdisks().iter().all(|p| !p.is_broken()));
    assert!(sim.lost_groups().is_empty());
    assert_eq!(sim.diagnostics().failures_injected, 0);
}

#[test]
fn test_fail_pdisk_cascades_to_vdisks() {
    let mut sim = Simulation::new(quiet_params(10, 1), 5);
    for _ in 0..3 {
        sim.simulate_hour().unwrap();
    }
    let pdisk_id = PDiskId::from_raw(4);

    assert!(sim.fail_pdisk(pdisk_id).unwrap());
    let pdisk = sim.pdisk(pdisk_id).unwrap();
    assert_eq!(pdisk.state(), PDiskState::Broken);
    assert_eq!(pdisk.available_vdisk_slots(), 0);
    assert!((pdisk.broken_time() - 3.0).abs() < f64::EPSILON);
    for &vdisk_id in pdisk.vdisks() {
        assert_eq!(sim.vdisk(vdisk_id).unwrap().state(), VDiskState::Faulty);
    }

    assert!(!sim.fail_pdisk(pdisk_id).unwrap());
    assert_eq!(sim.diagnostics().failures_injected, 1);
}

#[test]
fn test_unknown_pdisk_is_reported() {
    let mut sim = Simulation::new(quiet_params(10, 1), 5);
    let missing = PDiskId::from_raw(10_000);
    assert_eq!(
        sim.fail_pdisk(missing),
        Err(SimError::UnknownPDisk { pdisk: missing, vdisk: None })
    );
}

#[test]
fn test_replication_runs_to_completion() {
    let mut sim = Simulation::new(quiet_params(10, 2), 5);
    let failed = PDiskId::from_raw(0);
    let member = group0_member_on(&sim, failed);
    sim.fail_pdisk(failed).unwrap();

    sim.simulate_hour().unwrap();
    let vdisk = sim.vdisk(member).unwrap();
    assert_eq!(vdisk.state(), VDiskState::Replicating);
    assert!(vdisk.replication_triggered());
    assert_eq!(vdisk.replication_complete_time(), Some(1.0));

    // Both spares start with nine slots; the first one found wins the tie.
    let spares: Vec<PDiskId> = sim
        .pdisks_in_dc(DcId::ALL[0])
        .iter()
        .copied()
        .filter(|&id| sim.pdisk(id).unwrap().state() == PDiskState::Spare)
        .collect();
    assert_eq!(sim.pdisk(spares[0]).unwrap().available_vdisk_slots(), 8);
    assert_eq!(sim.pdisk(spares[1]).unwrap().available_vdisk_slots(), 9);

    sim.simulate_hour().unwrap();
    assert_eq!(sim.vdisk(member).unwrap().state(), VDiskState::Replicated);
    assert_eq!(sim.diagnostics().replications_started, 1);
    assert_eq!(sim.diagnostics().replications_completed, 1);

    // Ungrouped replicas on the failed disk are never rebuilt.
    let ungrouped = sim.pdisk(failed).unwrap().vdisks().iter().copied().find(|&id| id != member);
    let ungrouped = sim.vdisk(ungrouped.unwrap()).unwrap();
    assert_eq!(ungrouped.state(), VDiskState::Faulty);
    assert!(!ungrouped.replication_triggered());
}

#[test]
fn test_dispatch_prefers_spare_with_most_free_slots() {
    let mut sim = Simulation::new(quiet_params(10, 2), 5);
    let dc0 = active_pdisks(&sim, DcId::ALL[0]);

    sim.fail_pdisk(dc0[0]).unwrap();
    sim.simulate_hour().unwrap();
    // A disk backing group 1, so group 0 stays at a single fault.
    sim.fail_pdisk(dc0[3]).unwrap();
    sim.simulate_hour().unwrap();

    let spares: Vec<u32> = sim
        .pdisks_in_dc(DcId::ALL[0])
        .iter()
        .map(|&id| sim.pdisk(id).unwrap())
        .filter(|p| p.state() == PDiskState::Spare)
        .map(|p| p.available_vdisk_slots())
        .collect();
    assert_eq!(spares, vec![8, 8]);
}

#[test]
fn test_broken_spare_is_not_used() {
    let mut sim = Simulation::new(quiet_params(10, 1), 5);
    let spare = sim
        .pdisks_in_dc(DcId::ALL[0])
        .iter()
        .copied()
        .find(|&id| sim.pdisk(id).unwrap().state() == PDiskState::Spare)
        .unwrap();
    sim.fail_pdisk(spare).unwrap();

    let failed = PDiskId::from_raw(0);
    let member = group0_member_on(&sim, failed);
    sim.fail_pdisk(failed).unwrap();
    sim.simulate_hour().unwrap();

    let vdisk = sim.vdisk(member).unwrap();
    assert_eq!(vdisk.state(), VDiskState::Faulty);
    assert!(vdisk.replication_triggered());
    assert_eq!(sim.diagnostics().replications_without_spare, 1);
}

#[test]
fn test_replication_is_attempted_once_per_fault() {
    let mut sim = Simulation::new(quiet_params(10, 0), 5);
    let failed = PDiskId::from_raw(0);
    let member = group0_member_on(&sim, failed);
    sim.fail_pdisk(failed).unwrap();

    for _ in 0..48 {
        sim.simulate_hour().unwrap();
    }

    let vdisk = sim.vdisk(member).unwrap();
    assert_eq!(vdisk.state(), VDiskState::Faulty);
    assert!(vdisk.replication_triggered());
    assert_eq!(vdisk.replication_complete_time(), None);
    assert_eq!(sim.diagnostics().replications_without_spare, 1);
    assert!(sim.lost_groups().is_empty());
}

#[test]
fn test_third_same_dc_failure_without_spares_loses_group() {
    let mut sim = Simulation::new(quiet_params(10, 0), 5);
    let dc0 = active_pdisks(&sim, DcId::ALL[0]);
    let schedule = [(5u32, dc0[0]), (30, dc0[1]), (50, dc0[2])];

    let mut loss_hour = None;
    for hour in 0..MAX_TICKS {
        for &(at, pdisk) in &schedule {
            if at == hour {
                sim.fail_pdisk(pdisk).unwrap();
            }
        }
        sim.simulate_hour().unwrap();
        if !sim.lost_groups().is_empty() {
            loss_hour = Some(hour);
            break;
        }
    }

    assert_eq!(loss_hour, Some(50));
    assert_eq!(loss_hour.map(|h| h / HOURS_PER_DAY), Some(2));
    let lost_at = sim.lost_groups().get(&GroupId::from_raw(0)).copied();
    assert_eq!(lost_at, Some(50.0));
    assert_eq!(sim.lost_groups().len(), 1);
}

#[test]
fn test_cross_dc_failures_lose_group() {
    // (2, 1, 1) across datacenters, nothing to rebuild onto.
    let mut sim = Simulation::new(quiet_params(10, 0), 5);
    let dc0 = active_pdisks(&sim, DcId::ALL[0]);
    let dc1 = active_pdisks(&sim, DcId::ALL[1]);
    let dc2 = active_pdisks(&sim, DcId::ALL[2]);

    for pdisk in [dc0[0], dc0[1], dc1[0]] {
        sim.fail_pdisk(pdisk).unwrap();
    }
    sim.simulate_hour().unwrap();
    assert!(sim.lost_groups().is_empty());

    sim.fail_pdisk(dc2[0]).unwrap();
    sim.simulate_hour().unwrap();
    assert_eq!(sim.lost_groups().get(&GroupId::from_raw(0)).copied(), Some(1.0));
}

#[test]
fn test_lost_group_is_not_reevaluated() {
    let mut sim = Simulation::new(quiet_params(10, 0), 5);
    let dc0 = active_pdisks(&sim, DcId::ALL[0]);
    for &pdisk in &dc0[..3] {
        sim.fail_pdisk(pdisk).unwrap();
    }
    sim.simulate_hour().unwrap();
    sim.simulate_hour().unwrap();
    assert_eq!(sim.lost_groups().get(&GroupId::from_raw(0)).copied(), Some(0.0));
}

#[test]
fn test_failure_rate_whole_part_is_guaranteed() {
    let params = SimulationParams {
        disks_per_dc: 100,
        spare_disks_per_dc: 10,
        failure_rate_per_day: 48,
        ..SimulationParams::default()
    };
    let mut sim = Simulation::new(params, 11);
    for _ in 0..10 {
        sim.simulate_hour().unwrap();
    }
    assert_eq!(sim.diagnostics().failures_injected, 20);
    assert_eq!(sim.pdisks().iter().filter(|p| p.is_broken()).count(), 20);
}

#[test]
fn test_saturation_is_not_an_error() {
    let params = SimulationParams {
        disks_per_dc: 3,
        spare_disks_per_dc: 0,
        failure_rate_per_day: 24 * 20,
        ..SimulationParams::default()
    };
    let mut sim = Simulation::new(params, 3);
    sim.simulate_hour().unwrap();
    assert!(sim.diagnostics().saturated_hours >= 1);
    assert!(sim.diagnostics().failures_injected <= 9);

    for _ in 0..30 {
        sim.simulate_hour().unwrap();
    }
    assert!(sim.diagnostics().saturated_hours >= 31);
}

#[test]
fn test_same_seed_same_history() {
    let params = SimulationParams {
        disks_per_dc: 30,
        spare_disks_per_dc: 2,
        failure_rate_per_day: 60,
        ..SimulationParams::default()
    };
    let mut a = Simulation::new(params, 1234);
    let mut b = Simulation::new(params, 1234);
    for _ in 0..200 {
        a.simulate_hour().unwrap();
        b.simulate_hour().unwrap();
    }
    let broken = |sim: &Simulation| -> Vec<PDiskId> {
        sim.pdisks().iter().filter(|p| p.is_broken()).map(|p| p.id()).collect()
    };
    assert_eq!(broken(&a), broken(&b));
    assert_eq!(a.lost_groups(), b.lost_groups());
    assert_eq!(a.diagnostics(), b.diagnostics());
}

#[test]
fn test_recovered_pdisk_becomes_spare_and_retries() {
    let params = SimulationParams { pdisk_recovery_hours: 24, ..quiet_params(10, 0) };
    let mut sim = Simulation::new(params, 5);
    let failed = PDiskId::from_raw(0);
    let member = group0_member_on(&sim, failed);
    sim.fail_pdisk(failed).unwrap();

    for _ in 0..24 {
        sim.simulate_hour().unwrap();
    }
    assert!(sim.pdisk(failed).unwrap().is_broken());
    assert_eq!(sim.vdisk(member).unwrap().state(), VDiskState::Faulty);

    sim.simulate_hour().unwrap();
    let pdisk = sim.pdisk(failed).unwrap();
    assert_eq!(pdisk.state(), PDiskState::Spare);
    assert_eq!(pdisk.available_vdisk_slots(), 8);
    assert_eq!(sim.vdisk(member).unwrap().state(), VDiskState::Replicating);
    assert_eq!(sim.diagnostics().pdisks_recovered, 1);
    assert_eq!(sim.diagnostics().replications_without_spare, 1);
    assert_eq!(sim.diagnostics().replications_started, 1);
}

#[test]
fn test_rebuilt_copy_survives_failures_of_its_old_disk() {
    let params = SimulationParams { pdisk_recovery_hours: 2, ..quiet_params(10, 1) };
    let mut sim = Simulation::new(params, 9);
    let failed = PDiskId::from_raw(0);
    let spare = PDiskId::from_raw(10);
    let member = group0_member_on(&sim, failed);
    sim.fail_pdisk(failed).unwrap();

    // Rebuild onto the spare finishes at hour 1, the old disk returns at hour 2.
    for _ in 0..3 {
        sim.simulate_hour().unwrap();
    }
    assert_eq!(sim.vdisk(member).unwrap().state(), VDiskState::Replicated);
    let recovered = sim.pdisk(failed).unwrap();
    assert_eq!(recovered.state(), PDiskState::Spare);
    assert!(!recovered.vdisks().contains(&member));
    assert_eq!(recovered.vdisks().len(), 8);

    assert_eq!(sim.fail_pdisk(spare), Ok(true));
    assert_eq!(sim.vdisk(member).unwrap().state(), VDiskState::Replicated);

    assert_eq!(sim.fail_pdisk(failed), Ok(true));
    assert_eq!(sim.vdisk(member).unwrap().state(), VDiskState::Replicated);
    let leftover = sim.pdisk(failed).unwrap().vdisks()[0];
    assert_eq!(sim.vdisk(leftover).unwrap().state(), VDiskState::Faulty);

    sim.simulate_hour().unwrap();
    assert_eq!(sim.vdisk(member).unwrap().state(), VDiskState::Replicated);
    assert!(sim.lost_groups().is_empty());
}
