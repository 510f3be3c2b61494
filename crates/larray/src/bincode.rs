use crate::bridge::ArrayCopy;
use crate::element::ArrayElement;
use crate::shape::{ShapeDescriptor, MAX_RANK};

impl bincode::enc::Encode for ShapeDescriptor {
    fn encode<E: bincode::enc::Encoder>(
        &self,
        encoder: &mut E,
    ) -> Result<(), bincode::error::EncodeError> {
        // Fields go out in the descriptor's wire order.
        let (rank, counts, lower_bound, upper_bound, strides, offsets) = self.raw_parts();
        bincode::Encode::encode(&rank, encoder)?;
        bincode::Encode::encode(counts, encoder)?;
        bincode::Encode::encode(lower_bound, encoder)?;
        bincode::Encode::encode(upper_bound, encoder)?;
        bincode::Encode::encode(strides, encoder)?;
        bincode::Encode::encode(offsets, encoder)?;
        Ok(())
    }
}

impl<C> bincode::de::Decode<C> for ShapeDescriptor {
    fn decode<D: bincode::de::Decoder<Context = C>>(
        decoder: &mut D,
    ) -> Result<Self, bincode::error::DecodeError> {
        let rank = bincode::Decode::decode(decoder)?;
        let counts: [usize; MAX_RANK] = bincode::Decode::decode(decoder)?;
        let lower_bound: [i64; MAX_RANK] = bincode::Decode::decode(decoder)?;
        let upper_bound: [i64; MAX_RANK] = bincode::Decode::decode(decoder)?;
        let strides: [i64; MAX_RANK] = bincode::Decode::decode(decoder)?;
        let offsets: [i64; MAX_RANK] = bincode::Decode::decode(decoder)?;
        ShapeDescriptor::from_raw_parts(rank, counts, lower_bound, upper_bound, strides, offsets)
            .map_err(|e| bincode::error::DecodeError::OtherString(format!("Shape error: {e}")))
    }
}

impl<T, const N: usize> bincode::enc::Encode for ArrayCopy<T, N>
where
    T: ArrayElement + bincode::enc::Encode,
{
    fn encode<E: bincode::enc::Encoder>(
        &self,
        encoder: &mut E,
    ) -> Result<(), bincode::error::EncodeError> {
        bincode::Encode::encode(self.shape(), encoder)?;
        bincode::Encode::encode(&self.as_slice(), encoder)?;
        Ok(())
    }
}

impl<T, const N: usize, C> bincode::de::Decode<C> for ArrayCopy<T, N>
where
    T: ArrayElement + bincode::de::Decode<C>,
{
    fn decode<D: bincode::de::Decoder<Context = C>>(
        decoder: &mut D,
    ) -> Result<Self, bincode::error::DecodeError> {
        let shape = bincode::Decode::decode(decoder)?;
        let data: Vec<T> = bincode::Decode::decode(decoder)?;
        ArrayCopy::from_descriptor_vec(shape, data)
            .map_err(|e| bincode::error::DecodeError::OtherString(format!("Array error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArrayCopy, LocalArray, ShapeDescriptor};

    #[test]
    fn test_shape_descriptor_bincode() -> Result<(), Box<dyn std::error::Error>> {
        let shape = ShapeDescriptor::contiguous(&[2, 3, 4])?;
        let mut serialized = vec![0u8; 256];
        let config = bincode::config::standard();
        let length = bincode::encode_into_slice(&shape, &mut serialized, config)?;
        let deserialized: (ShapeDescriptor, usize) =
            bincode::decode_from_slice(&serialized[..length], config)?;
        assert_eq!(shape, deserialized.0);
        Ok(())
    }

    #[test]
    fn test_array_copy_bincode() -> Result<(), Box<dyn std::error::Error>> {
        let array = LocalArray::from_vec::<i64>(&[2, 3], vec![1, 2, 3, 4, 5, 6])?;
        let copy = array.data_copy::<i64, 2>()?;
        let mut serialized = vec![0u8; 512];
        let config = bincode::config::standard();
        let length = bincode::encode_into_slice(&copy, &mut serialized, config)?;
        let deserialized: (ArrayCopy<i64, 2>, usize) =
            bincode::decode_from_slice(&serialized[..length], config)?;
        assert_eq!(copy.as_slice(), deserialized.0.as_slice());
        assert_eq!(copy.shape(), deserialized.0.shape());
        Ok(())
    }
}
