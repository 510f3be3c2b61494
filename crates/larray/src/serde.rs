use serde::ser::SerializeStruct;
use serde::Deserialize;

use crate::bridge::ArrayCopy;
use crate::element::ArrayElement;
use crate::shape::{ShapeDescriptor, MAX_RANK};

impl<'de> serde::Deserialize<'de> for ShapeDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ShapeData {
            rank: usize,
            counts: [usize; MAX_RANK],
            lower_bound: [i64; MAX_RANK],
            upper_bound: [i64; MAX_RANK],
            strides: [i64; MAX_RANK],
            offsets: [i64; MAX_RANK],
        }

        let ShapeData {
            rank,
            counts,
            lower_bound,
            upper_bound,
            strides,
            offsets,
        } = ShapeData::deserialize(deserializer)?;

        ShapeDescriptor::from_raw_parts(rank, counts, lower_bound, upper_bound, strides, offsets)
            .map_err(serde::de::Error::custom)
    }
}

impl<T, const N: usize> serde::Serialize for ArrayCopy<T, N>
where
    T: ArrayElement + serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ArrayCopy", 2)?;
        state.serialize_field("data", self.as_slice())?;
        state.serialize_field("shape", self.shape())?;
        state.end()
    }
}

impl<'de, T, const N: usize> serde::Deserialize<'de> for ArrayCopy<T, N>
where
    T: ArrayElement + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CopyData<T> {
            data: Vec<T>,
            shape: ShapeDescriptor,
        }

        let CopyData { data, shape } = CopyData::deserialize(deserializer)?;

        ArrayCopy::from_descriptor_vec(shape, data).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArrayCopy, LocalArray, ShapeDescriptor};

    #[test]
    fn test_shape_descriptor_serde() -> Result<(), Box<dyn std::error::Error>> {
        let shape = ShapeDescriptor::with_lower_bounds(&[3, 4], &[0, 1])?;
        let serialized = serde_json::to_string(&shape)?;
        let deserialized: ShapeDescriptor = serde_json::from_str(&serialized)?;
        assert_eq!(shape, deserialized);
        Ok(())
    }

    #[test]
    fn test_shape_descriptor_rejects_broken_invariant() {
        // upper bound inconsistent with counts
        let json = r#"{
            "rank": 1,
            "counts": [3, 0, 0, 0, 0, 0, 0],
            "lower_bound": [1, 0, 0, 0, 0, 0, 0],
            "upper_bound": [9, 0, 0, 0, 0, 0, 0],
            "strides": [0, 0, 0, 0, 0, 0, 0],
            "offsets": [0, 0, 0, 0, 0, 0, 0]
        }"#;
        assert!(serde_json::from_str::<ShapeDescriptor>(json).is_err());
    }

    #[test]
    fn test_array_copy_serde() -> Result<(), Box<dyn std::error::Error>> {
        let array = LocalArray::from_vec::<f32>(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let copy = array.data_copy::<f32, 2>()?;
        let serialized = serde_json::to_string(&copy)?;
        let deserialized: ArrayCopy<f32, 2> = serde_json::from_str(&serialized)?;
        assert_eq!(copy.as_slice(), deserialized.as_slice());
        assert_eq!(copy.shape(), deserialized.shape());
        Ok(())
    }

    #[test]
    fn test_array_copy_rejects_length_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        let array = LocalArray::from_vec::<i32>(&[4], vec![1, 2, 3, 4])?;
        let copy = array.data_copy::<i32, 1>()?;
        let serialized = serde_json::to_string(&copy)?;
        // A rank-2 target disagrees with the encoded rank-1 descriptor.
        assert!(serde_json::from_str::<ArrayCopy<i32, 2>>(&serialized).is_err());
        Ok(())
    }
}
