//! Guidance texts for each engine transition

use std::net::Ipv4Addr;

use arp_proto::ProtocolMode;
use arp_topology::Device;

use crate::error::SimError;
use crate::events::Guidance;
use crate::script::Participant;

pub(crate) fn mode_selected(mode: ProtocolMode) -> Guidance {
    let body = match mode {
        ProtocolMode::Arp => {
            "ARP resolves an IP address to a MAC address on the local network.\n\
             1. Select the sender device\n\
             2. Broadcast an ARP request\n\
             3. Receive the MAC address reply\n\
             4. Update the ARP cache\n\n\
             Next: select a device."
        }
        ProtocolMode::Rarp => {
            "RARP lets a diskless device that only knows its MAC address obtain an IP address.\n\
             1. Select the diskless device\n\
             2. Send a RARP request to the server\n\
             3. Receive the IP address assignment\n\
             4. Update the device configuration\n\n\
             Next: select a device."
        }
    };
    Guidance::success(format!("{} Mode Selected", mode.name()), body)
}

pub(crate) fn device_selected(mode: ProtocolMode, device: &Device) -> Guidance {
    let role = match mode {
        ProtocolMode::Arp => "sender device",
        ProtocolMode::Rarp => "diskless device",
    };
    Guidance::success(
        "Device Selected",
        format!(
            "{} has been selected as the {}.\nIP address: {}\nMAC address: {}\n\n\
             Start the {} simulation to continue.",
            device.name,
            role,
            device.address,
            device.hardware_id,
            mode.name()
        ),
    )
}

pub(crate) fn started(mode: ProtocolMode, device: &Participant) -> Guidance {
    let body = match mode {
        ProtocolMode::Arp => format!(
            "{} broadcasts an ARP request; the target answers with its MAC address \
             and the ARP cache is updated.",
            device.name
        ),
        ProtocolMode::Rarp => format!(
            "{} asks the RARP server for an address; the server assigns one \
             and the device is reconfigured.",
            device.name
        ),
    };
    Guidance::success(format!("{} Simulation Started", mode.name()), body)
}

pub(crate) fn arp_complete(sender: &Participant, target: &Participant) -> Guidance {
    Guidance::success(
        "ARP Resolution Complete",
        format!(
            "{} found {}'s MAC address.\nIP {} -> MAC {}\n\n\
             Try a RARP simulation or reset to run again.",
            sender.name, target.name, target.address, target.hardware_id
        ),
    )
}

pub(crate) fn rarp_complete(client: &Participant, assigned: Ipv4Addr) -> Guidance {
    Guidance::success(
        "RARP Assignment Complete",
        format!(
            "{} received an IP address.\nMAC {} -> IP {}\n\n\
             Try an ARP simulation or reset to run again.",
            client.name, client.hardware_id, assigned
        ),
    )
}

pub(crate) fn pool_exhausted(client: &Participant) -> Guidance {
    Guidance::error(
        "Address Pool Exhausted",
        format!(
            "The RARP server has no free address left for {}. \
             Free an address in the device database and start again.",
            client.name
        ),
    )
}

pub(crate) fn assignment_not_applied(client: &Participant) -> Guidance {
    Guidance::warning(
        "Device Not Updated",
        format!(
            "{} is no longer in the device database; the assigned address was not stored.",
            client.name
        ),
    )
}

pub(crate) fn selection_cleared(device: &str) -> Guidance {
    Guidance::info(
        "Selection Cleared",
        format!("{} is no longer available. Select a device again.", device),
    )
}

pub(crate) fn reset() -> Guidance {
    Guidance::info(
        "Simulation Reset",
        "All state has been cleared. Select a protocol mode to begin.",
    )
}

pub(crate) fn topology_randomized() -> Guidance {
    Guidance::success(
        "Random Topology Generated",
        "A new random network topology has been created with fresh device configurations.",
    )
}

pub(crate) fn devices_updated() -> Guidance {
    Guidance::success(
        "Database Updated",
        "Network device configuration has been updated successfully.",
    )
}

/// Guidance for a rejected operation
pub(crate) fn rejected(err: &SimError) -> Guidance {
    match err {
        SimError::NoModeSelected => {
            Guidance::warning("Mode Required", "Select ARP or RARP mode first.")
        }
        SimError::NoDeviceSelected => Guidance::warning(
            "Selection Required",
            "Please select a device before starting the simulation.",
        ),
        SimError::NotSelectingDevice => Guidance::warning(
            "Device Already Selected",
            "The device can only be chosen on the first step. Pick the mode again to change it.",
        ),
        SimError::SimulationRunning => Guidance::warning(
            "Simulation Running",
            "Wait for the current simulation to finish or reset it.",
        ),
        SimError::SimulationComplete => Guidance::warning(
            "Simulation Complete",
            "Reset or select a mode to run another simulation.",
        ),
        SimError::UnknownDevice(id) => Guidance::warning(
            "Unknown Device",
            format!("No device with id {} exists.", id),
        ),
        SimError::DeviceOffline(id) => Guidance::warning(
            "Device Offline",
            format!("Device {} is offline and cannot take part.", id),
        ),
        SimError::NoResolutionTarget(id) => Guidance::error(
            "No Target Device",
            format!("There is no other device for {} to resolve.", id),
        ),
        SimError::InvalidTopology(e) => {
            Guidance::error("Database Not Updated", format!("The device list was rejected: {}", e))
        }
    }
}
