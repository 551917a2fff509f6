//! Onboard simulation model: lifecycle, inputs and outputs.
//!
//! Model inputs are free-form values defined by the loaded model, so they are
//! sent without clamping, in the shortest form that parses back exactly.

use super::{Header, ScpiClient};
use crate::error::Result;
use crate::scpi;
use crate::types::{ModelInfo, GLOBAL_MODEL_INPUT_COUNT, LOCAL_MODEL_INPUT_COUNT, MODEL_OUTPUT_COUNT};

const GLOBAL_INPUT: Header = Header::new("MOD:GLOB", "");
const LOCAL_INPUT: Header = Header::new("MOD:LOC", "");
const OUTPUT: Header = Header::new("MOD:OUT", "");

// Compound model commands are rooted explicitly so each one resolves from
// the top of the command tree.
const GLOBAL_INPUT_ROOTED: Header = Header::new(":MOD:GLOB", "");
const LOCAL_INPUT_ROOTED: Header = Header::new(":MOD:LOC", "");

fn input_arg(v: f32) -> String {
    v.to_string()
}

impl ScpiClient {
    /// Raw model state byte as reported by the unit.
    pub fn get_model_status(&self) -> Result<u8> {
        let reply = self.query("MOD:STAT?\r\n")?;
        scpi::parse_int(&reply)
    }

    pub fn load_model(&self) -> Result<()> {
        self.send("MOD:LOAD\r\n")
    }

    pub fn start_model(&self) -> Result<()> {
        self.send("MOD:START\r\n")
    }

    pub fn stop_model(&self) -> Result<()> {
        self.send("MOD:STOP\r\n")
    }

    pub fn unload_model(&self) -> Result<()> {
        self.send("MOD:UNLOAD\r\n")
    }

    pub fn get_model_info(&self) -> Result<ModelInfo> {
        let reply = self.query("MOD:INFO?\r\n")?;
        let [name, version] = scpi::parse_string_array::<2>(&reply)?;
        Ok(ModelInfo { name, version })
    }

    pub fn get_model_id(&self) -> Result<String> {
        let reply = self.query("MOD:ID?\r\n")?;
        scpi::parse_string(&reply)
    }

    // Global inputs

    pub fn set_global_model_input(&self, index: usize, value: f32) -> Result<()> {
        self.set_channel(GLOBAL_INPUT, index, GLOBAL_MODEL_INPUT_COUNT, &input_arg(value))
    }

    pub fn set_all_global_model_input(&self, value: f32) -> Result<()> {
        self.set_all_channels(GLOBAL_INPUT, GLOBAL_MODEL_INPUT_COUNT, &input_arg(value))
    }

    pub fn set_global_model_input_masked(&self, inputs: u32, value: f32) -> Result<()> {
        self.set_masked_channels(GLOBAL_INPUT, inputs, GLOBAL_MODEL_INPUT_COUNT, &input_arg(value))
    }

    pub fn set_global_model_inputs(&self, values: &[f32]) -> Result<()> {
        self.set_each_channel(GLOBAL_INPUT_ROOTED, values, GLOBAL_MODEL_INPUT_COUNT, input_arg)
    }

    pub fn get_global_model_input(&self, index: usize) -> Result<f32> {
        self.get_channel(GLOBAL_INPUT, index, GLOBAL_MODEL_INPUT_COUNT, scpi::parse_float)
    }

    pub fn get_all_global_model_inputs(&self) -> Result<[f32; GLOBAL_MODEL_INPUT_COUNT]> {
        self.get_all_channels(GLOBAL_INPUT, scpi::parse_float)
    }

    pub fn read_global_model_inputs(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(GLOBAL_INPUT, out, GLOBAL_MODEL_INPUT_COUNT, scpi::parse_float)
    }

    // Local inputs

    pub fn set_local_model_input(&self, index: usize, value: f32) -> Result<()> {
        self.set_channel(LOCAL_INPUT, index, LOCAL_MODEL_INPUT_COUNT, &input_arg(value))
    }

    pub fn set_all_local_model_input(&self, value: f32) -> Result<()> {
        self.set_all_channels(LOCAL_INPUT, LOCAL_MODEL_INPUT_COUNT, &input_arg(value))
    }

    pub fn set_local_model_input_masked(&self, inputs: u32, value: f32) -> Result<()> {
        self.set_masked_channels(LOCAL_INPUT, inputs, LOCAL_MODEL_INPUT_COUNT, &input_arg(value))
    }

    pub fn set_local_model_inputs(&self, values: &[f32]) -> Result<()> {
        self.set_each_channel(LOCAL_INPUT_ROOTED, values, LOCAL_MODEL_INPUT_COUNT, input_arg)
    }

    pub fn get_local_model_input(&self, index: usize) -> Result<f32> {
        self.get_channel(LOCAL_INPUT, index, LOCAL_MODEL_INPUT_COUNT, scpi::parse_float)
    }

    pub fn get_all_local_model_inputs(&self) -> Result<[f32; LOCAL_MODEL_INPUT_COUNT]> {
        self.get_all_channels(LOCAL_INPUT, scpi::parse_float)
    }

    pub fn read_local_model_inputs(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(LOCAL_INPUT, out, LOCAL_MODEL_INPUT_COUNT, scpi::parse_float)
    }

    // Outputs

    pub fn get_model_output(&self, index: usize) -> Result<f32> {
        self.get_channel(OUTPUT, index, MODEL_OUTPUT_COUNT, scpi::parse_float)
    }

    pub fn get_all_model_outputs(&self) -> Result<[f32; MODEL_OUTPUT_COUNT]> {
        self.get_all_channels(OUTPUT, scpi::parse_float)
    }

    pub fn read_model_outputs(&self, out: &mut [f32]) -> Result<()> {
        self.get_channels_into(OUTPUT, out, MODEL_OUTPUT_COUNT, scpi::parse_float)
    }
}
