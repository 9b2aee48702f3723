//! Discovery key abbreviation tables.
//!
//! The hub accepts compact key names in discovery payloads. Two independent
//! tables exist: one for top-level attributes and one for keys that appear
//! inside the nested `device` descriptor.

use std::collections::HashMap;

/// (abbreviation, canonical name) pairs for top-level attributes.
const GENERIC_ABBREVIATIONS: &[(&str, &str)] = &[
    ("act_t", "action_topic"),
    ("act_tpl", "action_template"),
    ("atype", "automation_type"),
    ("aux_cmd_t", "aux_command_topic"),
    ("aux_stat_tpl", "aux_state_template"),
    ("aux_stat_t", "aux_state_topic"),
    ("avty", "availability"),
    ("avty_mode", "availability_mode"),
    ("avty_t", "availability_topic"),
    ("avty_tpl", "availability_template"),
    ("away_mode_cmd_t", "away_mode_command_topic"),
    ("away_mode_stat_tpl", "away_mode_state_template"),
    ("away_mode_stat_t", "away_mode_state_topic"),
    ("b_tpl", "blue_template"),
    ("bri_cmd_t", "brightness_command_topic"),
    ("bri_cmd_tpl", "brightness_command_template"),
    ("bri_scl", "brightness_scale"),
    ("bri_stat_t", "brightness_state_topic"),
    ("bri_tpl", "brightness_template"),
    ("bri_val_tpl", "brightness_value_template"),
    ("clr_temp_cmd_tpl", "color_temp_command_template"),
    ("clr_temp_cmd_t", "color_temp_command_topic"),
    ("clr_temp_stat_t", "color_temp_state_topic"),
    ("clr_temp_tpl", "color_temp_template"),
    ("clr_temp_val_tpl", "color_temp_value_template"),
    ("cmd_off_tpl", "command_off_template"),
    ("cmd_on_tpl", "command_on_template"),
    ("cmd_t", "command_topic"),
    ("cmd_tpl", "command_template"),
    ("cod_arm_req", "code_arm_required"),
    ("cod_dis_req", "code_disarm_required"),
    ("cod_trig_req", "code_trigger_required"),
    ("curr_temp_t", "current_temperature_topic"),
    ("curr_temp_tpl", "current_temperature_template"),
    ("dev", "device"),
    ("dev_cla", "device_class"),
    ("dsp_prc", "suggested_display_precision"),
    ("e", "encoding"),
    ("en", "enabled_by_default"),
    ("ent_cat", "entity_category"),
    ("ent_pic", "entity_picture"),
    ("exp_aft", "expire_after"),
    ("fan_mode_cmd_t", "fan_mode_command_topic"),
    ("fan_mode_stat_tpl", "fan_mode_state_template"),
    ("fan_mode_stat_t", "fan_mode_state_topic"),
    ("frc_upd", "force_update"),
    ("g_tpl", "green_template"),
    ("hs_cmd_t", "hs_command_topic"),
    ("hs_stat_t", "hs_state_topic"),
    ("hs_val_tpl", "hs_value_template"),
    ("ic", "icon"),
    ("init", "initial"),
    ("json_attr", "json_attributes"),
    ("json_attr_t", "json_attributes_topic"),
    ("json_attr_tpl", "json_attributes_template"),
    ("lrst_t", "last_reset_topic"),
    ("lrst_val_tpl", "last_reset_value_template"),
    ("max_mirs", "max_mireds"),
    ("min_mirs", "min_mireds"),
    ("mode_cmd_t", "mode_command_topic"),
    ("mode_stat_tpl", "mode_state_template"),
    ("mode_stat_t", "mode_state_topic"),
    ("obj_id", "object_id"),
    ("off_dly", "off_delay"),
    ("opt", "optimistic"),
    ("osc_cmd_t", "oscillation_command_topic"),
    ("osc_stat_t", "oscillation_state_topic"),
    ("osc_val_tpl", "oscillation_value_template"),
    ("pct_cmd_t", "percentage_command_topic"),
    ("pct_stat_t", "percentage_state_topic"),
    ("pl_arm_away", "payload_arm_away"),
    ("pl_arm_home", "payload_arm_home"),
    ("pl_avail", "payload_available"),
    ("pl_cls", "payload_close"),
    ("pl_disarm", "payload_disarm"),
    ("pl_home", "payload_home"),
    ("pl_lock", "payload_lock"),
    ("pl_not_avail", "payload_not_available"),
    ("pl_not_home", "payload_not_home"),
    ("pl_off", "payload_off"),
    ("pl_on", "payload_on"),
    ("pl_open", "payload_open"),
    ("pl_osc_off", "payload_oscillation_off"),
    ("pl_osc_on", "payload_oscillation_on"),
    ("pl_prs", "payload_press"),
    ("pl_rst", "payload_reset"),
    ("pl_stop", "payload_stop"),
    ("pl_unlk", "payload_unlock"),
    ("pos_clsd", "position_closed"),
    ("pos_open", "position_open"),
    ("pos_t", "position_topic"),
    ("pos_tpl", "position_template"),
    ("pow_cmd_t", "power_command_topic"),
    ("pr_mode_cmd_t", "preset_mode_command_topic"),
    ("pr_mode_stat_t", "preset_mode_state_topic"),
    ("pr_mode_val_tpl", "preset_mode_value_template"),
    ("pr_modes", "preset_modes"),
    ("r_tpl", "red_template"),
    ("ret", "retain"),
    ("rgb_cmd_tpl", "rgb_command_template"),
    ("rgb_cmd_t", "rgb_command_topic"),
    ("rgb_stat_t", "rgb_state_topic"),
    ("rgb_val_tpl", "rgb_value_template"),
    ("send_cmd_t", "send_command_topic"),
    ("set_pos_tpl", "set_position_template"),
    ("set_pos_t", "set_position_topic"),
    ("src_type", "source_type"),
    ("stat_cla", "state_class"),
    ("stat_clsd", "state_closed"),
    ("stat_closing", "state_closing"),
    ("stat_off", "state_off"),
    ("stat_on", "state_on"),
    ("stat_open", "state_open"),
    ("stat_opening", "state_opening"),
    ("stat_stopped", "state_stopped"),
    ("stat_locked", "state_locked"),
    ("stat_unlocked", "state_unlocked"),
    ("stat_t", "state_topic"),
    ("stat_tpl", "state_template"),
    ("stat_val_tpl", "state_value_template"),
    ("step", "target_temp_step"),
    ("stype", "subtype"),
    ("sug_dsp_unit", "suggested_unit_of_measurement"),
    ("sup_clrm", "supported_color_modes"),
    ("sup_dur", "support_duration"),
    ("sup_vol", "support_volume_set"),
    ("sup_feat", "supported_features"),
    ("swing_mode_cmd_t", "swing_mode_command_topic"),
    ("swing_mode_stat_tpl", "swing_mode_state_template"),
    ("swing_mode_stat_t", "swing_mode_state_topic"),
    ("t", "topic"),
    ("temp_cmd_t", "temperature_command_topic"),
    ("temp_cmd_tpl", "temperature_command_template"),
    ("temp_stat_t", "temperature_state_topic"),
    ("temp_stat_tpl", "temperature_state_template"),
    ("temp_unit", "temperature_unit"),
    ("tilt_clsd_val", "tilt_closed_value"),
    ("tilt_cmd_t", "tilt_command_topic"),
    ("tilt_cmd_tpl", "tilt_command_template"),
    ("tilt_inv_stat", "tilt_invert_state"),
    ("tilt_max", "tilt_max"),
    ("tilt_min", "tilt_min"),
    ("tilt_opnd_val", "tilt_opened_value"),
    ("tilt_opt", "tilt_optimistic"),
    ("tilt_status_t", "tilt_status_topic"),
    ("tilt_status_tpl", "tilt_status_template"),
    ("uniq_id", "unique_id"),
    ("unit_of_meas", "unit_of_measurement"),
    ("val_tpl", "value_template"),
    ("xy_cmd_t", "xy_command_topic"),
    ("xy_stat_t", "xy_state_topic"),
    ("xy_val_tpl", "xy_value_template"),
];

/// (abbreviation, canonical name) pairs for keys inside `device`.
const DEVICE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("cns", "connections"),
    ("ids", "identifiers"),
    ("mf", "manufacturer"),
    ("mdl", "model"),
    ("mdl_id", "model_id"),
    ("hw", "hw_version"),
    ("sw", "sw_version"),
    ("sa", "suggested_area"),
    ("sn", "serial_number"),
    ("cu", "configuration_url"),
    ("via_device", "via_device_id"),
];

/// Injective mapping between canonical attribute names and their wire form.
#[derive(Debug, Clone, Default)]
pub struct AbbreviationTable {
    abbreviations: HashMap<String, String>,
    expansions: HashMap<String, String>,
}

impl AbbreviationTable {
    /// Build a table from `(abbreviation, canonical)` pairs.
    ///
    /// Identity pairs are skipped: a key that abbreviates to itself needs no
    /// entry and would make the table non-idempotent.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut table = Self::default();
        for (abbr, canonical) in pairs {
            if abbr == canonical {
                continue;
            }
            table
                .abbreviations
                .insert(canonical.to_string(), abbr.to_string());
            table
                .expansions
                .insert(abbr.to_string(), canonical.to_string());
        }
        table
    }

    /// Compact form of `name`, if one exists.
    pub fn abbreviate(&self, name: &str) -> Option<&str> {
        self.abbreviations.get(name).map(String::as_str)
    }

    /// Canonical form of `abbr`, if it is a known abbreviation.
    pub fn expand(&self, abbr: &str) -> Option<&str> {
        self.expansions.get(abbr).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.abbreviations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abbreviations.is_empty()
    }

    /// True when no two canonical names share an abbreviation.
    pub fn is_injective(&self) -> bool {
        self.abbreviations.len() == self.expansions.len()
    }
}

/// The generic and device tables, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct AbbreviationTables {
    pub generic: AbbreviationTable,
    pub device: AbbreviationTable,
}

impl AbbreviationTables {
    pub fn new(generic: AbbreviationTable, device: AbbreviationTable) -> Self {
        Self { generic, device }
    }

    /// Tables matching the Home Assistant MQTT discovery abbreviations.
    pub fn home_assistant() -> Self {
        Self::new(
            AbbreviationTable::from_pairs(GENERIC_ABBREVIATIONS.iter().copied()),
            AbbreviationTable::from_pairs(DEVICE_ABBREVIATIONS.iter().copied()),
        )
    }
}

impl Default for AbbreviationTables {
    fn default() -> Self {
        Self::home_assistant()
    }
}
